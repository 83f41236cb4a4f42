// Library root — exposes the configuration pipeline for the binary and
// integration tests. The binary entry point is src/main.rs.

pub mod config;
pub mod env;
pub mod error;
pub mod logger;
pub mod sites;
