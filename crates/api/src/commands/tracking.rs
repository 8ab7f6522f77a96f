//! Activity tracking commands

use signalkeeper_domain::{MonitorStatus, Result, SignalKeeperError};

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

/// Live status of the sampling loop.
pub async fn tracking_get_status(ctx: &AppContext) -> Result<MonitorStatus> {
    execute_command("tracking::get_status", async {
        ctx.tracking.status().await.map_err(SignalKeeperError::from)
    })
    .await
}

/// Pause or resume classification, returning the new paused flag.
pub async fn tracking_toggle_pause(ctx: &AppContext) -> Result<bool> {
    execute_command("tracking::toggle_pause", async {
        ctx.tracking.toggle_pause().await.map_err(SignalKeeperError::from)
    })
    .await
}
