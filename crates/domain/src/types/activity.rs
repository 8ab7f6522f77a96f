//! Activity classification types
//!
//! A [`ForegroundWindow`] is what the platform source reports for one tick.
//! The classifier turns it into a [`ProductivityState`]; consecutive ticks in
//! the same window are coalesced into one [`ActivitySample`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::impl_wire_enum;
use crate::utils::title::{normalize_app_name, normalize_title};

/// Productivity classification of a foreground app/window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ProductivityState {
    /// Productive work.
    Green,
    /// Neutral or unclassified.
    Amber,
    /// Distracting.
    Red,
}

impl_wire_enum!(ProductivityState {
    Green => "GREEN",
    Amber => "AMBER",
    Red => "RED",
});

impl ProductivityState {
    /// Any non-GREEN state counts toward a drift episode.
    pub fn is_drift(self) -> bool {
        !matches!(self, Self::Green)
    }
}

/// Snapshot of the foreground application as reported by an activity source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForegroundWindow {
    pub app_name: String,
    pub window_title: String,
}

impl ForegroundWindow {
    /// Build a normalized snapshot (trimmed app name, collapsed and truncated
    /// title).
    pub fn new(app_name: impl AsRef<str>, window_title: impl AsRef<str>) -> Self {
        Self {
            app_name: normalize_app_name(app_name.as_ref()),
            window_title: normalize_title(window_title.as_ref()),
        }
    }

    /// Same app and same window title.
    pub fn same_context(&self, other: &Self) -> bool {
        self.app_name == other.app_name && self.window_title == other.window_title
    }
}

/// Finalized, immutable span of time spent in one app/window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivitySample {
    pub id: String,
    pub app_name: String,
    pub window_title: String,
    pub state: ProductivityState,
    pub duration_seconds: i64,
    /// Wall-clock start of the span.
    pub timestamp: DateTime<Utc>,
}

impl ActivitySample {
    /// Create a sample with a fresh time-ordered id.
    pub fn new(
        window: &ForegroundWindow,
        state: ProductivityState,
        duration_seconds: i64,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::now_v7().to_string(),
            app_name: window.app_name.clone(),
            window_title: window.window_title.clone(),
            state,
            duration_seconds: duration_seconds.max(0),
            timestamp,
        }
    }
}

/// Live status of the tracking loop.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitorStatus {
    pub is_running: bool,
    pub is_paused: bool,
    pub current_state: Option<ProductivityState>,
    pub current_app_name: Option<String>,
    pub current_window_title: Option<String>,
}

/// Emitted whenever the classified state or the foreground window changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivityStateChanged {
    pub previous_state: Option<ProductivityState>,
    pub state: ProductivityState,
    pub app_name: String,
    pub window_title: String,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_wire_names_round_trip_case_insensitively() {
        assert_eq!("green".parse::<ProductivityState>().unwrap(), ProductivityState::Green);
        assert_eq!("RED".parse::<ProductivityState>().unwrap(), ProductivityState::Red);
        assert!("purple".parse::<ProductivityState>().is_err());
        assert_eq!(ProductivityState::Amber.to_string(), "AMBER");
    }

    #[test]
    fn state_serializes_uppercase() {
        let json = serde_json::to_string(&ProductivityState::Amber).unwrap();
        assert_eq!(json, "\"AMBER\"");
    }

    #[test]
    fn only_green_is_not_drift() {
        assert!(!ProductivityState::Green.is_drift());
        assert!(ProductivityState::Amber.is_drift());
        assert!(ProductivityState::Red.is_drift());
    }

    #[test]
    fn foreground_window_normalizes_whitespace() {
        let a = ForegroundWindow::new("  Code ", "main.rs   -  project");
        let b = ForegroundWindow::new("Code", "main.rs - project");
        assert!(a.same_context(&b));
        assert_eq!(a.app_name, "Code");
    }

    #[test]
    fn sample_clamps_negative_duration() {
        let window = ForegroundWindow::new("Slack", "general");
        let sample = ActivitySample::new(&window, ProductivityState::Red, -5, Utc::now());
        assert_eq!(sample.duration_seconds, 0);
        assert_eq!(sample.app_name, "Slack");
    }
}
