//! Tracing subscriber setup
//!
//! `RUST_LOG` wins over the configured level. Output goes to stderr so
//! stdout stays clean for JSON.

use gqm_core::{LogFormat, LoggingConfig};
use tracing_subscriber::{fmt, EnvFilter};

/// Filter from `RUST_LOG`, else the configured directive, else `info`
#[must_use]
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.level))
        .unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Install the global subscriber
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_tracing(config: &LoggingConfig) -> anyhow::Result<()> {
    let filter = env_filter(config);
    let result = match config.format {
        LogFormat::Json => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .json()
            .with_target(false)
            .try_init(),
        LogFormat::Compact => fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .try_init(),
    };
    result.map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
}
