//! Logging initialization.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::LogLevel;

/// Environment variable overriding `--log-level` with full filter directives,
/// e.g. `GF_LOG=gf_convention=debug,warn`.
pub const LOG_ENV: &str = "GF_LOG";

/// Initialize logging with the specified level.
///
/// Logs are written to stderr so stdout stays clean for granule listings.
pub fn init_logging(level: LogLevel) -> Result<()> {
    let filter = match std::env::var(LOG_ENV) {
        Ok(directives) if !directives.trim().is_empty() => EnvFilter::try_new(&directives)
            .with_context(|| format!("Invalid {LOG_ENV} directives '{directives}'"))?,
        _ => EnvFilter::new(level.as_directive()),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Cannot initialize logging: {e}"))
}
