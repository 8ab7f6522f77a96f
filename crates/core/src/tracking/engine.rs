//! Tracking engine - one evaluation per tick
//!
//! Owns the monitor, detector and tick clock. The infra scheduler drives it
//! from a single task, so no internal locking is needed.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use signalkeeper_domain::constants::{DEFAULT_MAX_TICK_GAP_MS, DEFAULT_SOURCE_TIMEOUT_MS};
use signalkeeper_domain::{
    ActivitySample, DriftStatus, ForegroundWindow, MonitorStatus, NudgeConfig, NudgeEvent,
    ProductivityState, Result, SignalKeeperError, SnoozeEntry, TrackingConfig,
};
use tracing::{debug, error, info, trace, warn};

use super::classifier::StateClassifier;
use super::clock::{Tick, TickClock};
use super::monitor::ActivityMonitor;
use super::ports::{ActivitySampleRepository, ActivitySource};
use crate::events::EventHub;
use crate::nudge::ports::NudgeDispatcher;
use crate::nudge::DriftDetector;

/// What a single tick did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickOutcome {
    /// Classified state, `None` when paused or the source failed.
    pub state: Option<ProductivityState>,
    pub samples_written: usize,
    pub nudge: Option<NudgeEvent>,
    pub discontinuity: bool,
    pub source_failed: bool,
    pub paused: bool,
}

pub struct TrackingEngine {
    source: Arc<dyn ActivitySource>,
    samples: Arc<dyn ActivitySampleRepository>,
    classifier: Arc<StateClassifier>,
    hub: Arc<EventHub>,
    dispatcher: Option<Arc<dyn NudgeDispatcher>>,
    monitor: ActivityMonitor,
    detector: DriftDetector,
    clock: TickClock,
    source_timeout: Duration,
    last_source_error: Option<String>,
}

impl TrackingEngine {
    pub fn new(
        source: Arc<dyn ActivitySource>,
        samples: Arc<dyn ActivitySampleRepository>,
        hub: Arc<EventHub>,
    ) -> Self {
        Self {
            source,
            samples,
            classifier: Arc::new(StateClassifier::default()),
            hub,
            dispatcher: None,
            monitor: ActivityMonitor::new(),
            detector: DriftDetector::default(),
            clock: TickClock::new(Duration::from_millis(DEFAULT_MAX_TICK_GAP_MS)),
            source_timeout: Duration::from_millis(DEFAULT_SOURCE_TIMEOUT_MS),
            last_source_error: None,
        }
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<StateClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn NudgeDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    #[must_use]
    pub fn with_nudge_config(mut self, config: NudgeConfig) -> Self {
        self.detector = DriftDetector::new(config);
        self
    }

    /// Apply source timeout and discontinuity threshold from configuration.
    #[must_use]
    pub fn with_tracking_config(mut self, config: &TrackingConfig) -> Self {
        self.source_timeout = Duration::from_millis(config.source_timeout_ms);
        self.clock = TickClock::new(Duration::from_millis(config.max_tick_gap_ms));
        self
    }

    /// Sample, classify, coalesce and evaluate drift for one tick.
    ///
    /// Never fails: source errors skip the tick and storage errors are
    /// logged.
    pub async fn tick(&mut self, tick: Tick) -> TickOutcome {
        if self.monitor.is_paused() {
            return TickOutcome { paused: true, ..TickOutcome::default() };
        }

        let mut outcome = TickOutcome::default();

        let continuity = self.clock.observe(tick);
        if continuity.is_break() {
            info!(?continuity, "Clock discontinuity detected; closing current sample and episode");
            if let Some(sample) = self.monitor.cut_at_last_seen() {
                outcome.samples_written += self.persist(sample).await;
            }
            self.detector.reset_episode();
            outcome.discontinuity = true;
        }

        let window = match self.read_foreground().await {
            Ok(window) => {
                self.clear_source_error();
                window
            }
            Err(err) => {
                self.note_source_error(&err);
                if let Some(sample) = self.monitor.cut_at_last_seen() {
                    outcome.samples_written += self.persist(sample).await;
                }
                // Unobserved time is not continuous drift.
                self.detector.reset_episode();
                outcome.source_failed = true;
                return outcome;
            }
        };

        let state = self.classifier.classify(&window);
        trace!(app = %window.app_name, %state, "Classified foreground window");

        let app_name = window.app_name.clone();
        let observation = self.monitor.observe(window, state, tick);
        if let Some(sample) = observation.finalized {
            outcome.samples_written += self.persist(sample).await;
        }
        if let Some(change) = observation.state_changed {
            debug!(
                previous = ?change.previous_state,
                state = %change.state,
                app = %change.app_name,
                "Activity state changed"
            );
            self.hub.emit_state_changed(&change);
        }

        if let Some(nudge) = self.detector.evaluate(state, &app_name, tick) {
            self.deliver(&nudge).await;
            outcome.nudge = Some(nudge);
        }

        outcome.state = Some(state);
        outcome
    }

    /// Suspend classification. The in-flight sample is closed at `tick` and
    /// the drift episode is dropped.
    pub async fn pause(&mut self, tick: Tick) -> usize {
        if self.monitor.is_paused() {
            return 0;
        }
        let written = match self.monitor.pause(tick) {
            Some(sample) => self.persist(sample).await,
            None => 0,
        };
        self.detector.reset_episode();
        self.clock.reset();
        info!(samples_written = written, "Tracking paused");
        written
    }

    pub fn resume(&mut self) {
        if self.monitor.is_paused() {
            self.monitor.resume();
            self.clock.reset();
            info!("Tracking resumed");
        }
    }

    /// Flip the pause flag, returning the new value.
    pub async fn toggle_pause(&mut self, tick: Tick) -> bool {
        if self.monitor.is_paused() {
            self.resume();
            false
        } else {
            self.pause(tick).await;
            true
        }
    }

    /// Close and persist the in-flight sample (on stop).
    pub async fn flush(&mut self, tick: Tick) -> usize {
        let written = match self.monitor.finalize_at(tick) {
            Some(sample) => self.persist(sample).await,
            None => 0,
        };
        self.detector.reset_episode();
        self.clock.reset();
        written
    }

    /// Close the in-flight sample at `tick` without ending the drift
    /// episode. Used at local midnight so each day owns its own samples.
    pub async fn split_sample(&mut self, tick: Tick) -> usize {
        match self.monitor.finalize_at(tick) {
            Some(sample) => self.persist(sample).await,
            None => 0,
        }
    }

    pub fn is_paused(&self) -> bool {
        self.monitor.is_paused()
    }

    pub fn status(&self, is_running: bool) -> MonitorStatus {
        self.monitor.status(is_running)
    }

    pub fn drift_status(&self) -> DriftStatus {
        self.detector.status()
    }

    pub fn nudge_config(&self) -> NudgeConfig {
        self.detector.config()
    }

    /// # Errors
    /// Returns `SignalKeeperError::InvalidInput` for a rejected config.
    pub fn set_nudge_config(&mut self, config: NudgeConfig) -> Result<()> {
        self.update_nudge_config(|_| config).map(|_| ())
    }

    /// Derive the new config from the current one and apply it, returning
    /// what was applied.
    ///
    /// # Errors
    /// Returns `SignalKeeperError::InvalidInput` for a rejected config; the
    /// current config is kept.
    pub fn update_nudge_config(
        &mut self,
        update: impl FnOnce(NudgeConfig) -> NudgeConfig,
    ) -> Result<NudgeConfig> {
        let config = update(self.detector.config());
        self.detector.set_config(config)?;
        info!(
            first_nudge_threshold_ms = config.first_nudge_threshold_ms,
            nudge_cooldown_ms = config.nudge_cooldown_ms,
            "Nudge configuration updated"
        );
        Ok(config)
    }

    /// # Errors
    /// Returns `SignalKeeperError::InvalidInput` for a blank app or an
    /// out-of-range duration.
    pub fn snooze_app(
        &mut self,
        app_name: &str,
        minutes: u32,
        now: DateTime<Utc>,
    ) -> Result<SnoozeEntry> {
        let entry = self.detector.snooze(app_name, minutes, now)?;
        info!(app = %entry.app_name, expires_at = %entry.expires_at, "App snoozed");
        Ok(entry)
    }

    pub fn active_snoozes(&mut self, now: DateTime<Utc>) -> Vec<SnoozeEntry> {
        self.detector.active_snoozes(now)
    }

    pub fn hub(&self) -> &Arc<EventHub> {
        &self.hub
    }

    async fn read_foreground(&self) -> Result<ForegroundWindow> {
        match tokio::time::timeout(self.source_timeout, self.source.foreground()).await {
            Ok(result) => result,
            Err(_) => Err(SignalKeeperError::Platform(format!(
                "foreground lookup timed out after {} ms",
                self.source_timeout.as_millis()
            ))),
        }
    }

    /// Log each distinct source error once until a read succeeds.
    fn note_source_error(&mut self, err: &SignalKeeperError) {
        let message = err.to_string();
        if self.last_source_error.as_deref() == Some(message.as_str()) {
            trace!(error = %message, "Foreground window still unavailable");
            return;
        }
        warn!(error = %message, "Foreground window unavailable; skipping tick");
        self.last_source_error = Some(message);
    }

    fn clear_source_error(&mut self) {
        if let Some(previous) = self.last_source_error.take() {
            info!(previous_error = %previous, "Foreground window available again");
        }
    }

    async fn persist(&self, sample: ActivitySample) -> usize {
        let (app, state, seconds) = (sample.app_name.clone(), sample.state, sample.duration_seconds);
        match self.samples.save_sample(sample).await {
            Ok(()) => {
                debug!(app = %app, %state, duration_seconds = seconds, "Activity sample saved");
                1
            }
            Err(err) => {
                error!(error = %err, app = %app, "Failed to persist activity sample");
                0
            }
        }
    }

    async fn deliver(&self, nudge: &NudgeEvent) {
        let listeners = self.hub.emit_nudge(nudge);
        let delivery = self.detector.config().delivery();
        info!(
            app = %nudge.current_app,
            drift_duration_ms = nudge.drift_duration_ms,
            listeners,
            "Nudge triggered"
        );

        if delivery.is_silent() {
            return;
        }
        if let Some(dispatcher) = &self.dispatcher {
            if let Err(err) = dispatcher.dispatch(nudge, delivery).await {
                warn!(error = %err, app = %nudge.current_app, "Nudge dispatch failed");
            }
        }
    }
}
