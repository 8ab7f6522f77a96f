//! Logging and tracing setup
//!
//! One global `tracing` subscriber per process. `RUST_LOG` takes precedence
//! over the configured filter; `LogFormat::Json` emits one JSON object per
//! event.

use signalkeeper_domain::{LogFormat, LoggingConfig, Result, SignalKeeperError};
use tracing_subscriber::EnvFilter;

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (tests, or a
/// second call), `Ok(true)` when this call installed it.
///
/// # Errors
/// Returns `SignalKeeperError::Config` if the configured filter directive is
/// malformed and `RUST_LOG` is unset.
pub fn init_tracing(config: &LoggingConfig) -> Result<bool> {
    let filter = build_filter(config)?;
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(true);

    let installed = match config.format {
        LogFormat::Json => builder.json().with_current_span(false).try_init().is_ok(),
        LogFormat::Pretty => builder.try_init().is_ok(),
    };

    if installed {
        tracing::debug!(format = ?config.format, "Tracing initialized");
    }
    Ok(installed)
}

fn build_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(&config.filter).map_err(|e| {
        SignalKeeperError::Config(format!("invalid logging.filter '{}': {e}", config.filter))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_filter_parses() {
        let config = LoggingConfig { filter: "info,signalkeeper_infra=debug".into(), ..Default::default() };
        assert!(build_filter(&config).is_ok());
    }

    #[test]
    fn second_init_is_a_noop() {
        let config = LoggingConfig::default();
        let _ = init_tracing(&config).unwrap();
        assert!(!init_tracing(&config).unwrap());
    }
}
