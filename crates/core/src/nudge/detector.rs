//! Drift state machine
//!
//! ```text
//! OnTrack --non-GREEN--> Drifting --threshold, not snoozed, cooled down--> Nudged
//!                           |                                               |
//!                           +--threshold, app snoozed--> Snoozed            |
//!    <------------------------- GREEN from any phase ----------------------+
//! Nudged --next non-GREEN tick--> Drifting (further nudges cooldown-gated)
//! ```
//!
//! Drift duration is measured on the monotonic clock from the first non-GREEN
//! tick of the episode. Snooze expiries are wall-clock instants.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use signalkeeper_domain::constants::MAX_SNOOZE_MINUTES;
use signalkeeper_domain::{
    DriftPhase, DriftStatus, NudgeConfig, NudgeEvent, ProductivityState, Result,
    SignalKeeperError, SnoozeEntry,
};
use tracing::debug;

use crate::tracking::Tick;

#[derive(Debug, Clone)]
struct Episode {
    started: Tick,
    last_seen: Tick,
    app_name: String,
}

impl Episode {
    fn elapsed(&self) -> Duration {
        self.last_seen.since(&self.started)
    }
}

#[derive(Debug, Default)]
pub struct DriftDetector {
    config: NudgeConfig,
    phase: DriftPhase,
    episode: Option<Episode>,
    last_nudge: Option<Tick>,
    snoozes: HashMap<String, DateTime<Utc>>,
}

impl DriftDetector {
    pub fn new(config: NudgeConfig) -> Self {
        Self { config, ..Self::default() }
    }

    pub fn config(&self) -> NudgeConfig {
        self.config
    }

    /// Replace the configuration; takes effect on the next evaluation.
    ///
    /// # Errors
    /// Returns `SignalKeeperError::InvalidInput` if the config is rejected.
    pub fn set_config(&mut self, config: NudgeConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn phase(&self) -> DriftPhase {
        self.phase
    }

    /// Evaluate one classified tick. Returns the nudge to emit, if any.
    pub fn evaluate(
        &mut self,
        state: ProductivityState,
        app_name: &str,
        tick: Tick,
    ) -> Option<NudgeEvent> {
        self.prune_snoozes(tick.wall);

        if !state.is_drift() {
            if self.episode.take().is_some() {
                debug!(previous_phase = %self.phase, "Back on track");
            }
            self.phase = DriftPhase::OnTrack;
            return None;
        }

        let episode = self.episode.get_or_insert_with(|| Episode {
            started: tick,
            last_seen: tick,
            app_name: app_name.to_string(),
        });
        episode.last_seen = tick;
        episode.app_name = app_name.to_string();
        let elapsed = episode.elapsed();

        let threshold = Duration::from_millis(self.config.first_nudge_threshold_ms);
        if elapsed < threshold {
            self.phase = DriftPhase::Drifting;
            return None;
        }

        if self.is_snoozed(app_name) {
            self.phase = DriftPhase::Snoozed;
            return None;
        }

        let cooldown = Duration::from_millis(self.config.nudge_cooldown_ms);
        let cooled_down = self.last_nudge.map_or(true, |last| tick.since(&last) >= cooldown);
        if !cooled_down {
            self.phase = DriftPhase::Drifting;
            return None;
        }

        self.phase = DriftPhase::Nudged;
        self.last_nudge = Some(tick);
        let drift_duration_ms = u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX);
        debug!(app = app_name, drift_duration_ms, "Drift threshold reached, nudging");

        Some(NudgeEvent {
            current_app: app_name.to_string(),
            drift_duration_ms,
            state,
            triggered_at: tick.wall,
        })
    }

    /// Drop the current episode (clock discontinuity, failed read, pause,
    /// stop).
    /// Cooldown and snoozes are kept.
    pub fn reset_episode(&mut self) {
        self.episode = None;
        self.phase = DriftPhase::OnTrack;
    }

    /// Suppress nudges for `app_name` for `minutes`. Re-snoozing keeps the
    /// later of the existing and new expiry.
    ///
    /// # Errors
    /// Returns `SignalKeeperError::InvalidInput` for a blank app name or a
    /// duration outside `1..=1440` minutes.
    pub fn snooze(&mut self, app_name: &str, minutes: u32, now: DateTime<Utc>) -> Result<SnoozeEntry> {
        let app_name = app_name.trim();
        if app_name.is_empty() {
            return Err(SignalKeeperError::InvalidInput("appName must not be empty".into()));
        }
        if minutes == 0 || minutes > MAX_SNOOZE_MINUTES {
            return Err(SignalKeeperError::InvalidInput(format!(
                "minutes must be between 1 and {MAX_SNOOZE_MINUTES}, got {minutes}"
            )));
        }

        let requested = now + chrono::Duration::minutes(i64::from(minutes));
        let expires_at = self
            .snoozes
            .entry(app_name.to_string())
            .and_modify(|existing| {
                if requested > *existing {
                    *existing = requested;
                }
            })
            .or_insert(requested);

        Ok(SnoozeEntry { app_name: app_name.to_string(), expires_at: *expires_at })
    }

    /// Snoozes still active at `now`, soonest expiry first.
    pub fn active_snoozes(&mut self, now: DateTime<Utc>) -> Vec<SnoozeEntry> {
        self.prune_snoozes(now);
        let mut entries: Vec<SnoozeEntry> = self
            .snoozes
            .iter()
            .map(|(app_name, expires_at)| SnoozeEntry {
                app_name: app_name.clone(),
                expires_at: *expires_at,
            })
            .collect();
        entries.sort_by(|a, b| a.expires_at.cmp(&b.expires_at).then(a.app_name.cmp(&b.app_name)));
        entries
    }

    pub fn status(&self) -> DriftStatus {
        match &self.episode {
            Some(episode) => DriftStatus {
                is_drifting: true,
                drift_duration_ms: u64::try_from(episode.elapsed().as_millis()).unwrap_or(u64::MAX),
                current_app: Some(episode.app_name.clone()),
                phase: self.phase,
            },
            None => DriftStatus { phase: self.phase, ..DriftStatus::default() },
        }
    }

    fn is_snoozed(&self, app_name: &str) -> bool {
        self.snoozes.contains_key(app_name)
    }

    fn prune_snoozes(&mut self, now: DateTime<Utc>) {
        self.snoozes.retain(|_, expires_at| *expires_at > now);
    }
}
