//! Listener registry for nudge and state-change events.
//!
//! Handlers are registered per topic and receive a subscription id that
//! removes exactly that handler. Handlers run synchronously on the emitting
//! task, outside the registry lock, so a handler may unsubscribe itself. A
//! panicking handler is logged and skipped; the emitter keeps running.

use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use signalkeeper_domain::constants::{EVENT_ACTIVITY_STATE_CHANGED, EVENT_NUDGE_TRIGGERED};
use signalkeeper_domain::{ActivityStateChanged, NudgeEvent};
use tracing::{error, trace};

pub type NudgeHandler = Arc<dyn Fn(&NudgeEvent) + Send + Sync>;
pub type StateChangeHandler = Arc<dyn Fn(&ActivityStateChanged) + Send + Sync>;

/// Opaque handle returned by the `on_*` registration methods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl From<u64> for SubscriptionId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
pub struct EventHub {
    next_id: AtomicU64,
    nudge_handlers: RwLock<Vec<(SubscriptionId, NudgeHandler)>>,
    state_handlers: RwLock<Vec<(SubscriptionId, StateChangeHandler)>>,
}

impl std::fmt::Debug for EventHub {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventHub")
            .field("nudge_handlers", &self.nudge_handlers.read().len())
            .field("state_handlers", &self.state_handlers.read().len())
            .finish()
    }
}

impl EventHub {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_nudge_triggered<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&NudgeEvent) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.nudge_handlers.write().push((id, Arc::new(handler)));
        id
    }

    pub fn on_activity_state_changed<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&ActivityStateChanged) + Send + Sync + 'static,
    {
        let id = self.allocate_id();
        self.state_handlers.write().push((id, Arc::new(handler)));
        id
    }

    /// Remove the handler registered under `id`. Returns `false` if it was
    /// already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let removed_nudge = remove(&self.nudge_handlers, id);
        removed_nudge || remove(&self.state_handlers, id)
    }

    pub fn listener_count(&self) -> usize {
        self.nudge_handlers.read().len() + self.state_handlers.read().len()
    }

    /// Invoke every nudge handler in registration order. Returns how many
    /// handlers completed without panicking.
    pub fn emit_nudge(&self, event: &NudgeEvent) -> usize {
        let handlers: Vec<(SubscriptionId, NudgeHandler)> =
            self.nudge_handlers.read().iter().map(|(id, h)| (*id, Arc::clone(h))).collect();
        trace!(topic = EVENT_NUDGE_TRIGGERED, listeners = handlers.len(), "Emitting event");
        handlers
            .iter()
            .filter(|(id, handler)| invoke(EVENT_NUDGE_TRIGGERED, *id, || handler(event)))
            .count()
    }

    /// Invoke every state-change handler in registration order.
    pub fn emit_state_changed(&self, event: &ActivityStateChanged) -> usize {
        let handlers: Vec<(SubscriptionId, StateChangeHandler)> =
            self.state_handlers.read().iter().map(|(id, h)| (*id, Arc::clone(h))).collect();
        trace!(topic = EVENT_ACTIVITY_STATE_CHANGED, listeners = handlers.len(), "Emitting event");
        handlers
            .iter()
            .filter(|(id, handler)| invoke(EVENT_ACTIVITY_STATE_CHANGED, *id, || handler(event)))
            .count()
    }

    fn allocate_id(&self) -> SubscriptionId {
        SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

fn invoke(topic: &str, id: SubscriptionId, call: impl FnOnce()) -> bool {
    match catch_unwind(AssertUnwindSafe(call)) {
        Ok(()) => true,
        Err(payload) => {
            error!(
                topic,
                subscription = %id,
                reason = panic_message(payload.as_ref()),
                "Event handler panicked"
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("non-string panic payload")
}

fn remove<H>(handlers: &RwLock<Vec<(SubscriptionId, H)>>, id: SubscriptionId) -> bool {
    let mut guard = handlers.write();
    let before = guard.len();
    guard.retain(|(existing, _)| *existing != id);
    guard.len() != before
}
