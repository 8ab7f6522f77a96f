//! Coalesces classified ticks into activity samples
//!
//! Consecutive ticks in the same app/window with the same state extend one
//! open sample. The sample is finalized when the context changes, tracking
//! pauses or stops, a read fails, or the clock jumps.

use std::time::Duration;

use signalkeeper_domain::{
    ActivitySample, ActivityStateChanged, ForegroundWindow, MonitorStatus, ProductivityState,
};

use super::clock::Tick;

#[derive(Debug, Clone)]
struct OpenSample {
    window: ForegroundWindow,
    state: ProductivityState,
    started: Tick,
    last_seen: Tick,
}

impl OpenSample {
    fn close(self, end: Tick) -> Option<ActivitySample> {
        let seconds = rounded_seconds(end.since(&self.started));
        (seconds > 0).then(|| {
            ActivitySample::new(&self.window, self.state, seconds, self.started.wall)
        })
    }
}

/// Result of feeding one classified tick to the monitor.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Observation {
    /// Sample closed by this tick, ready to persist.
    pub finalized: Option<ActivitySample>,
    pub state_changed: Option<ActivityStateChanged>,
}

#[derive(Debug, Default)]
pub struct ActivityMonitor {
    open: Option<OpenSample>,
    paused: bool,
    last_window: Option<ForegroundWindow>,
    last_state: Option<ProductivityState>,
}

impl ActivityMonitor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Feed one successfully resolved and classified tick.
    pub fn observe(
        &mut self,
        window: ForegroundWindow,
        state: ProductivityState,
        tick: Tick,
    ) -> Observation {
        if self.paused {
            return Observation::default();
        }

        let mut observation = Observation::default();

        match self.open.as_mut() {
            Some(open) if open.state == state && open.window.same_context(&window) => {
                open.last_seen = tick;
            }
            _ => {
                observation.finalized = self.open.take().and_then(|open| open.close(tick));
                self.open =
                    Some(OpenSample { window: window.clone(), state, started: tick, last_seen: tick });
            }
        }

        if self.last_state != Some(state) {
            observation.state_changed = Some(ActivityStateChanged {
                previous_state: self.last_state,
                state,
                app_name: window.app_name.clone(),
                window_title: window.window_title.clone(),
                timestamp: tick.wall,
            });
        }
        self.last_state = Some(state);
        self.last_window = Some(window);

        observation
    }

    /// Close the open sample at its last observed tick. Used after a clock
    /// discontinuity or a failed read, where the time since then is unknown.
    pub fn cut_at_last_seen(&mut self) -> Option<ActivitySample> {
        let open = self.open.take()?;
        let end = open.last_seen;
        open.close(end)
    }

    /// Close the open sample at `tick`.
    pub fn finalize_at(&mut self, tick: Tick) -> Option<ActivitySample> {
        self.open.take().and_then(|open| open.close(tick))
    }

    /// Suspend classification, closing the in-flight sample at `tick`.
    pub fn pause(&mut self, tick: Tick) -> Option<ActivitySample> {
        self.paused = true;
        self.finalize_at(tick)
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn current_state(&self) -> Option<ProductivityState> {
        self.last_state
    }

    pub fn current_window(&self) -> Option<&ForegroundWindow> {
        self.last_window.as_ref()
    }

    pub fn status(&self, is_running: bool) -> MonitorStatus {
        MonitorStatus {
            is_running,
            is_paused: self.paused,
            current_state: self.last_state,
            current_app_name: self.last_window.as_ref().map(|w| w.app_name.clone()),
            current_window_title: self.last_window.as_ref().map(|w| w.window_title.clone()),
        }
    }
}

fn rounded_seconds(duration: Duration) -> i64 {
    let millis = duration.as_millis().saturating_add(500) / 1000;
    i64::try_from(millis).unwrap_or(i64::MAX)
}
