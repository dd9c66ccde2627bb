//! Log output setup

use crate::config::TelemetryConfig;
use crate::error::{Error, Result};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over [`TelemetryConfig::log_filter`].
///
/// # Errors
///
/// Returns an error if the filter is invalid or a subscriber is already installed.
pub fn init_tracing(config: &TelemetryConfig) -> Result<()> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&config.log_filter).map_err(|e| {
            Error::config(format!("invalid log filter: {}", e), "LOG_FILTER")
        })?,
    };

    let registry = tracing_subscriber::registry().with(filter);
    let installed = if config.json {
        registry.with(fmt::layer().json()).try_init()
    } else {
        registry.with(fmt::layer().compact()).try_init()
    };

    installed.map_err(|e| Error::Other(format!("Failed to install tracing subscriber: {}", e)))
}
