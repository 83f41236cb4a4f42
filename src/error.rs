//! Application-wide error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("config error: {0}")]
    Config(String),

    #[error("dotenv error: {0}")]
    Dotenv(String),

    #[error("logger error: {0}")]
    Logger(String),
}
