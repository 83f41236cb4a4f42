//! micropub-github — configuration bootstrap entry point.
//!
//! Startup sequence:
//!   1. Init logger (RUST_LOG overrides the "info" default)
//!   2. Load config (dotenv merge happens inside the loader; an explicit
//!      DOTENV_FILE that fails to load is fatal)
//!   3. Derive the sites registry
//!   4. Print status and exit

use micropub_github::{config, error::AppError, logger, sites};
use tracing::info;

fn main() {
    if let Err(e) = run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    logger::init("info")?;

    let config = config::load()?;

    info!(
        env = %config.env,
        port = %config.port,
        user_agent = %config.user_agent,
        "config loaded"
    );

    let sites = sites::derive(&config);

    info!(site_count = sites.len(), "sites registry derived");
    println!(
        "✓ Config loaded: env={}, port={}, sites=[{}]",
        config.env,
        config.port,
        sites.keys().cloned().collect::<Vec<_>>().join(", ")
    );

    Ok(())
}
