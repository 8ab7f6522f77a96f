//! Application constants
//!
//! Centralized location for all domain-level constants used throughout the
//! application.

// Sampling loop
pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 5_000;
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 2_000;
/// Gap between two ticks (monotonic, or wall vs monotonic drift) beyond which
/// the current sample and drift episode are cut.
pub const DEFAULT_MAX_TICK_GAP_MS: u64 = 60_000;

// Nudges
pub const DEFAULT_FIRST_NUDGE_THRESHOLD_MS: u64 = 5 * 60 * 1_000;
pub const DEFAULT_NUDGE_COOLDOWN_MS: u64 = 10 * 60 * 1_000;
pub const MAX_SNOOZE_MINUTES: u32 = 24 * 60;

// Scoring
pub const NEUTRAL_SIGNAL_SCORE: u8 = 50;
/// A day extends the streak only when its score is strictly above this value.
pub const PRODUCTIVE_SCORE_THRESHOLD: u8 = 60;
pub const INSIGHTS_WINDOW_DAYS: i64 = 7;
pub const INSIGHTS_TOP_APPS: usize = 5;
/// Longest span accepted by range queries.
pub const MAX_RANGE_DAYS: i64 = 366;

// Tasks
pub const MIN_TASK_PRIORITY: u8 = 1;
pub const MAX_TASK_PRIORITY: u8 = 5;
pub const DEFAULT_TASK_PRIORITY: u8 = 3;
pub const DEFAULT_SIGNAL_QUEUE_LIMIT: usize = 5;
pub const DEFAULT_BACKLOG_LIMIT: usize = 50;
pub const MAX_QUERY_LIMIT: usize = 500;
pub const MAX_TASK_TITLE_LENGTH: usize = 200;

// Window titles
pub const MAX_TITLE_LENGTH: usize = 255;
pub const TITLE_TRUNCATE_SUFFIX: &str = "...";
pub const UNKNOWN_APP_NAME: &str = "Unknown";

// Event topics
pub const EVENT_NUDGE_TRIGGERED: &str = "nudge-triggered";
pub const EVENT_ACTIVITY_STATE_CHANGED: &str = "activity-state-changed";
