//! Port interfaces for nudge delivery

use async_trait::async_trait;
use signalkeeper_domain::{NudgeDelivery, NudgeEvent, Result};

/// Delivers a fired nudge downstream (OS notification, AI-authored message).
///
/// Failures are logged by the caller and never affect detector state.
#[async_trait]
pub trait NudgeDispatcher: Send + Sync {
    async fn dispatch(&self, event: &NudgeEvent, delivery: NudgeDelivery) -> Result<()>;
}
