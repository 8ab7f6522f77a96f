//! Scheduler error types

use signalkeeper_domain::SignalKeeperError;
use thiserror::Error;

use crate::errors::InfraError;

/// Tracking scheduler lifecycle errors
#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The actor stopped answering commands
    #[error("Tracking actor is not accepting commands")]
    ChannelClosed,

    /// The actor was lost (panicked or aborted); the scheduler cannot restart
    #[error("Tracking actor is unavailable: {0}")]
    Unavailable(String),

    /// Operation timed out
    #[error("Operation timed out after {millis} ms")]
    Timeout { millis: u64 },

    /// Task join failed
    #[error("Task join failed: {0}")]
    TaskJoinFailed(String),
}

impl From<SchedulerError> for InfraError {
    fn from(err: SchedulerError) -> Self {
        InfraError(SignalKeeperError::Internal(err.to_string()))
    }
}

impl From<SchedulerError> for SignalKeeperError {
    fn from(err: SchedulerError) -> Self {
        InfraError::from(err).into()
    }
}

/// Convenience type alias for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;
