use std::time::Duration;

use signalkeeper_domain::SignalKeeperError;
use tracing::{info, warn};

/// Log the outcome of a command execution with structured fields.
///
/// # Parameters
/// * `command` - Logical command identifier (e.g. `"stats::get_day"`).
/// * `elapsed` - Duration the command execution took.
/// * `error` - The failure, if any.
///
/// Callers must avoid forwarding sensitive values in `command`.
#[inline]
pub fn log_command_execution(
    command: &str,
    elapsed: Duration,
    error: Option<&SignalKeeperError>,
) {
    let duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);

    match error {
        None => info!(command, duration_ms, success = true, "command_execution_success"),
        Some(err) => warn!(
            command,
            duration_ms,
            success = false,
            error_type = error_label(err),
            error = %err,
            "command_execution_failure"
        ),
    }
}

/// Convert a `SignalKeeperError` into a stable label suitable for logging.
#[inline]
pub fn error_label(error: &SignalKeeperError) -> &'static str {
    error.label()
}
