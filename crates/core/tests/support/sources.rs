//! Activity sources and nudge dispatchers for driving the engine

use std::collections::VecDeque;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use signalkeeper_core::{ActivitySource, NudgeDispatcher};
use signalkeeper_domain::{
    ForegroundWindow, NudgeDelivery, NudgeEvent, Result as DomainResult, SignalKeeperError,
};

/// Returns queued results in order, then repeats the last one forever.
pub struct ScriptedSource {
    script: Mutex<VecDeque<DomainResult<ForegroundWindow>>>,
    last: Mutex<DomainResult<ForegroundWindow>>,
}

impl ScriptedSource {
    pub fn constant(app: &str, title: &str) -> Self {
        Self::new(vec![Ok(ForegroundWindow::new(app, title))])
    }

    pub fn new(script: Vec<DomainResult<ForegroundWindow>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            last: Mutex::new(Err(SignalKeeperError::Platform("script exhausted".into()))),
        }
    }

    /// Replace whatever comes next with `window`, repeated.
    pub fn switch_to(&self, app: &str, title: &str) {
        self.script.lock().clear();
        *self.last.lock() = Ok(ForegroundWindow::new(app, title));
    }

    pub fn fail_with(&self, message: &str) {
        self.script.lock().clear();
        *self.last.lock() = Err(SignalKeeperError::Platform(message.to_string()));
    }
}

#[async_trait]
impl ActivitySource for ScriptedSource {
    async fn foreground(&self) -> DomainResult<ForegroundWindow> {
        if let Some(next) = self.script.lock().pop_front() {
            *self.last.lock() = next.clone();
            return next;
        }
        self.last.lock().clone()
    }
}

/// Never answers within any reasonable deadline.
pub struct HangingSource {
    pub delay: Duration,
}

#[async_trait]
impl ActivitySource for HangingSource {
    async fn foreground(&self) -> DomainResult<ForegroundWindow> {
        tokio::time::sleep(self.delay).await;
        Ok(ForegroundWindow::new("Late", "too late"))
    }
}

#[derive(Default)]
pub struct RecordingDispatcher {
    pub delivered: Mutex<Vec<(NudgeEvent, NudgeDelivery)>>,
    fail: bool,
}

impl RecordingDispatcher {
    pub fn failing() -> Self {
        Self { delivered: Mutex::new(Vec::new()), fail: true }
    }

    pub fn count(&self) -> usize {
        self.delivered.lock().len()
    }
}

#[async_trait]
impl NudgeDispatcher for RecordingDispatcher {
    async fn dispatch(&self, event: &NudgeEvent, delivery: NudgeDelivery) -> DomainResult<()> {
        self.delivered.lock().push((event.clone(), delivery));
        if self.fail {
            return Err(SignalKeeperError::Platform("notification center unavailable".into()));
        }
        Ok(())
    }
}
