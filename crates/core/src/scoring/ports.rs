//! Port interfaces for daily statistics

use async_trait::async_trait;
use chrono::NaiveDate;
use signalkeeper_domain::{DailyStats, Result};

/// Materialized per-day rows, written only by day close-out.
#[async_trait]
pub trait DailyStatsRepository: Send + Sync {
    async fn get_day(&self, date: NaiveDate) -> Result<Option<DailyStats>>;

    /// Rows with `start <= date <= end`, oldest first.
    async fn get_range(&self, start: NaiveDate, end: NaiveDate) -> Result<Vec<DailyStats>>;

    /// Most recent row by date.
    async fn latest(&self) -> Result<Option<DailyStats>>;

    /// Most recent row strictly before `date`.
    async fn latest_before(&self, date: NaiveDate) -> Result<Option<DailyStats>>;

    /// Insert the row, or refresh minutes/score/tasks of an existing row.
    /// An existing row keeps its stored streak. Returns the stored row.
    async fn upsert_preserving_streak(&self, stats: DailyStats) -> Result<DailyStats>;
}
