//! Port interfaces for activity tracking
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use signalkeeper_domain::{ActivitySample, ForegroundWindow, Result};

/// Resolves the foreground application and window title
#[async_trait]
pub trait ActivitySource: Send + Sync {
    /// Snapshot of the current foreground window.
    ///
    /// # Errors
    /// `SignalKeeperError::Platform` when the window cannot be resolved
    /// (permission denied, OS error). The tracking loop skips the tick.
    async fn foreground(&self) -> Result<ForegroundWindow>;
}

/// Persistence for finalized activity samples
#[async_trait]
pub trait ActivitySampleRepository: Send + Sync {
    /// Persist a finalized sample. Samples are never updated afterwards.
    async fn save_sample(&self, sample: ActivitySample) -> Result<()>;

    /// Samples with `start <= timestamp < end`, oldest first.
    async fn samples_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<ActivitySample>>;

    /// Delete samples older than `before`, returning the number removed.
    async fn delete_samples_before(&self, before: DateTime<Utc>) -> Result<usize>;
}
