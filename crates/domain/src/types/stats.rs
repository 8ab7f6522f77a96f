//! Daily score, streak and insight types
//!
//! [`DailyStats`] is a materialized view over activity samples and task rows.
//! Everything except `streak` can be recomputed at any time.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/* -------------------------------------------------------------------------- */
/* Minute totals */
/* -------------------------------------------------------------------------- */

/// Per-state minute totals, each rounded once from summed seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinuteTotals {
    pub green_minutes: u32,
    pub amber_minutes: u32,
    pub red_minutes: u32,
}

impl MinuteTotals {
    pub fn total(&self) -> u32 {
        self.green_minutes + self.amber_minutes + self.red_minutes
    }
}

/* -------------------------------------------------------------------------- */
/* Daily stats */
/* -------------------------------------------------------------------------- */

/// One local calendar day of aggregated activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub green_minutes: u32,
    pub amber_minutes: u32,
    pub red_minutes: u32,
    pub signal_score: u8,
    pub tasks_completed: u32,
    pub streak: u32,
}

impl DailyStats {
    pub fn minutes(&self) -> MinuteTotals {
        MinuteTotals {
            green_minutes: self.green_minutes,
            amber_minutes: self.amber_minutes,
            red_minutes: self.red_minutes,
        }
    }

    pub fn total_minutes(&self) -> u32 {
        self.minutes().total()
    }
}

/// Summary block attached to a single-day report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub total_tracked_minutes: u32,
    /// Share of tracked minutes that were GREEN, 0-100.
    pub productive_percentage: u8,
    pub is_today: bool,
}

/// `stats_get_day` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayReport {
    #[serde(flatten)]
    pub stats: DailyStats,
    pub summary: DaySummary,
}

/* -------------------------------------------------------------------------- */
/* Ranges */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeTotals {
    pub green_minutes: u32,
    pub amber_minutes: u32,
    pub red_minutes: u32,
    pub total_tracked_minutes: u32,
    pub tasks_completed: u32,
}

/// `stats_get_range` payload. Days without samples are absent, not zero-filled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeReport {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub days: Vec<DailyStats>,
    pub totals: RangeTotals,
    /// Unweighted mean of the daily scores; `None` when no day has samples.
    pub average_score: Option<f64>,
}

/* -------------------------------------------------------------------------- */
/* Streak */
/* -------------------------------------------------------------------------- */

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakReport {
    pub streak: u32,
    pub last_recorded_date: Option<NaiveDate>,
    pub last_signal_score: Option<u8>,
    pub is_active: bool,
    pub message: String,
}

/* -------------------------------------------------------------------------- */
/* Insights */
/* -------------------------------------------------------------------------- */

/// Per-app minutes over the insight window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppUsage {
    pub app_name: String,
    pub total_minutes: u32,
    pub green_minutes: u32,
    pub amber_minutes: u32,
    pub red_minutes: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskStatusBreakdown {
    pub pending: u32,
    pub in_progress: u32,
    pub completed: u32,
    pub deferred: u32,
    pub total: u32,
}

/// `stats_get_insights` payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub top_apps: Vec<AppUsage>,
    pub most_productive_apps: Vec<AppUsage>,
    pub most_distracting_apps: Vec<AppUsage>,
    pub task_breakdown: TaskStatusBreakdown,
    /// Completed tasks as a percentage of all tasks, 0-100.
    pub completion_rate: u8,
}
