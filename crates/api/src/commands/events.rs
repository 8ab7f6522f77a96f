//! Listener registration for nudges and activity state changes

use signalkeeper_core::SubscriptionId;
use signalkeeper_domain::{ActivityStateChanged, NudgeEvent};
use tracing::debug;

use crate::AppContext;

/// Register a nudge listener. Handlers run on the tracking task and must not
/// block.
pub fn on_nudge_triggered<F>(ctx: &AppContext, handler: F) -> SubscriptionId
where
    F: Fn(&NudgeEvent) + Send + Sync + 'static,
{
    let id = ctx.events.on_nudge_triggered(handler);
    debug!(subscription = %id, "Nudge listener registered");
    id
}

pub fn on_activity_state_changed<F>(ctx: &AppContext, handler: F) -> SubscriptionId
where
    F: Fn(&ActivityStateChanged) + Send + Sync + 'static,
{
    let id = ctx.events.on_activity_state_changed(handler);
    debug!(subscription = %id, "State-change listener registered");
    id
}

/// Remove a listener. Returns `false` for an unknown or already removed id.
pub fn unsubscribe(ctx: &AppContext, id: SubscriptionId) -> bool {
    ctx.events.unsubscribe(id)
}
