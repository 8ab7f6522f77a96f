//! Drift and nudge types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_FIRST_NUDGE_THRESHOLD_MS, DEFAULT_NUDGE_COOLDOWN_MS};
use crate::impl_wire_enum;
use crate::types::activity::ProductivityState;
use crate::{Result, SignalKeeperError};

/// User-tunable nudge configuration. Applied on the next evaluation tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NudgeConfig {
    pub first_nudge_threshold_ms: u64,
    pub nudge_cooldown_ms: u64,
    pub show_system_notifications: bool,
    pub ai_nudges_enabled: bool,
}

impl Default for NudgeConfig {
    fn default() -> Self {
        Self {
            first_nudge_threshold_ms: DEFAULT_FIRST_NUDGE_THRESHOLD_MS,
            nudge_cooldown_ms: DEFAULT_NUDGE_COOLDOWN_MS,
            show_system_notifications: true,
            ai_nudges_enabled: true,
        }
    }
}

impl NudgeConfig {
    /// Reject a zero threshold; a zero cooldown is allowed.
    pub fn validate(&self) -> Result<()> {
        if self.first_nudge_threshold_ms == 0 {
            return Err(SignalKeeperError::InvalidInput(
                "firstNudgeThresholdMs must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Which downstream actions a fired nudge should take.
    pub fn delivery(&self) -> NudgeDelivery {
        NudgeDelivery {
            system_notification: self.show_system_notifications,
            ai_message: self.ai_nudges_enabled,
        }
    }
}

/// Drift state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftPhase {
    #[default]
    OnTrack,
    Drifting,
    Nudged,
    Snoozed,
}

impl_wire_enum!(DriftPhase {
    OnTrack => "on_track",
    Drifting => "drifting",
    Nudged => "nudged",
    Snoozed => "snoozed",
});

/// Transient drift view exposed to the UI; never persisted.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriftStatus {
    pub is_drifting: bool,
    pub drift_duration_ms: u64,
    pub current_app: Option<String>,
    pub phase: DriftPhase,
}

/// Suppresses nudges for one app until `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnoozeEntry {
    pub app_name: String,
    pub expires_at: DateTime<Utc>,
}

/// One-shot interruption emitted when drift crosses the threshold.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeEvent {
    pub current_app: String,
    pub drift_duration_ms: u64,
    pub state: ProductivityState,
    pub triggered_at: DateTime<Utc>,
}

/// Gating for the external nudge dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NudgeDelivery {
    pub system_notification: bool,
    pub ai_message: bool,
}

impl NudgeDelivery {
    /// Nothing to deliver downstream.
    pub fn is_silent(&self) -> bool {
        !self.system_notification && !self.ai_message
    }
}
