//! Domain types and models

pub mod activity;
pub mod nudge;
pub mod stats;
pub mod task;

pub use activity::{
    ActivitySample, ActivityStateChanged, ForegroundWindow, MonitorStatus, ProductivityState,
};
pub use nudge::{DriftPhase, DriftStatus, NudgeConfig, NudgeDelivery, NudgeEvent, SnoozeEntry};
pub use stats::{
    AppUsage, DailyStats, DayReport, DaySummary, Insights, MinuteTotals, RangeReport,
    RangeTotals, StreakReport, TaskStatusBreakdown,
};
pub use task::{NewTask, Task, TaskStatus, TaskUpdate};
