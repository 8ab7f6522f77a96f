//! Nudge configuration, drift status and snooze commands

use signalkeeper_domain::{DriftStatus, NudgeConfig, Result, SignalKeeperError, SnoozeEntry};

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

pub async fn nudge_get_config(ctx: &AppContext) -> Result<NudgeConfig> {
    execute_command("nudge::get_config", async {
        ctx.tracking.nudge_config().await.map_err(SignalKeeperError::from)
    })
    .await
}

/// Replace the nudge configuration; applied on the next tick.
pub async fn nudge_set_config(ctx: &AppContext, config: NudgeConfig) -> Result<NudgeConfig> {
    execute_command("nudge::set_config", async {
        match ctx.tracking.set_nudge_config(config).await {
            Ok(applied) => applied.map(|()| config),
            Err(err) => Err(SignalKeeperError::from(err)),
        }
    })
    .await
}

/// Apply `update` to the current nudge configuration in one step; concurrent
/// updates are serialised by the tracking actor.
pub async fn nudge_update_config<F>(ctx: &AppContext, update: F) -> Result<NudgeConfig>
where
    F: FnOnce(NudgeConfig) -> NudgeConfig + Send + 'static,
{
    execute_command("nudge::update_config", async {
        match ctx.tracking.update_nudge_config(update).await {
            Ok(applied) => applied,
            Err(err) => Err(SignalKeeperError::from(err)),
        }
    })
    .await
}

pub async fn nudge_get_drift_status(ctx: &AppContext) -> Result<DriftStatus> {
    execute_command("nudge::get_drift_status", async {
        ctx.tracking.drift_status().await.map_err(SignalKeeperError::from)
    })
    .await
}

/// Suppress nudges for `app_name` for `minutes` (1..=1440).
pub async fn nudge_snooze_app(
    ctx: &AppContext,
    app_name: &str,
    minutes: u32,
) -> Result<SnoozeEntry> {
    execute_command("nudge::snooze_app", async {
        match ctx.tracking.snooze_app(app_name, minutes).await {
            Ok(entry) => entry,
            Err(err) => Err(SignalKeeperError::from(err)),
        }
    })
    .await
}

pub async fn nudge_active_snoozes(ctx: &AppContext) -> Result<Vec<SnoozeEntry>> {
    execute_command("nudge::active_snoozes", async {
        ctx.tracking.active_snoozes().await.map_err(SignalKeeperError::from)
    })
    .await
}
