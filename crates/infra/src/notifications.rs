//! Nudge delivery outside the process.
//!
//! System notifications go through `osascript` on macOS and `notify-send` on
//! Linux. AI-authored messages have no backend yet, so a request for one is
//! only logged.

use std::time::Duration;

use async_trait::async_trait;
use signalkeeper_core::NudgeDispatcher;
use signalkeeper_domain::{NudgeDelivery, NudgeEvent, Result as DomainResult};
use tokio::task;
use tracing::{debug, info};

use crate::database::manager::map_join_error;
#[cfg(any(target_os = "macos", target_os = "linux"))]
use crate::platform::run_with_timeout;

const NOTIFY_TIMEOUT: Duration = Duration::from_secs(3);

/// Dispatcher that raises an OS notification per nudge.
#[derive(Debug, Clone)]
pub struct SystemNudgeDispatcher {
    /// Off in headless runs and tests; the nudge is still logged.
    notifications_enabled: bool,
}

impl Default for SystemNudgeDispatcher {
    fn default() -> Self {
        Self { notifications_enabled: true }
    }
}

impl SystemNudgeDispatcher {
    pub fn new(notifications_enabled: bool) -> Self {
        Self { notifications_enabled }
    }
}

#[async_trait]
impl NudgeDispatcher for SystemNudgeDispatcher {
    async fn dispatch(&self, event: &NudgeEvent, delivery: NudgeDelivery) -> DomainResult<()> {
        if delivery.ai_message {
            debug!(app = %event.current_app, "AI nudge requested; no message backend configured");
        }
        if !delivery.system_notification {
            return Ok(());
        }

        let body = nudge_body(event);
        if !self.notifications_enabled {
            info!(app = %event.current_app, body = %body, "Nudge notification (suppressed)");
            return Ok(());
        }

        task::spawn_blocking(move || show_notification(&body)).await.map_err(map_join_error)?
    }
}

/// Human-readable notification text.
pub fn nudge_body(event: &NudgeEvent) -> String {
    let minutes = event.drift_duration_ms / 60_000;
    if minutes == 0 {
        format!("You've drifted into {}. Time to refocus?", event.current_app)
    } else {
        format!(
            "You've been in {} for {minutes} min. Time to refocus?",
            event.current_app
        )
    }
}

#[cfg(target_os = "macos")]
fn show_notification(body: &str) -> DomainResult<()> {
    let script = format!(
        "display notification \"{}\" with title \"SignalKeeper\"",
        body.replace('\\', "\\\\").replace('"', "\\\"")
    );
    run_with_timeout("osascript", &["-e", &script], NOTIFY_TIMEOUT).map(|_| ())
}

#[cfg(target_os = "linux")]
fn show_notification(body: &str) -> DomainResult<()> {
    run_with_timeout("notify-send", &["SignalKeeper", body], NOTIFY_TIMEOUT).map(|_| ())
}

#[cfg(not(any(target_os = "macos", target_os = "linux")))]
fn show_notification(body: &str) -> DomainResult<()> {
    let _ = NOTIFY_TIMEOUT;
    info!(body = %body, "System notifications are not supported on this platform");
    Ok(())
}
