//! Scheduling infrastructure for the live tracking loop
//!
//! The scheduler follows the same runtime rules everywhere:
//! - Explicit lifecycle management (start/stop)
//! - Join handles for spawned tasks
//! - Cancellation token support
//! - Timeout on the shutdown join

pub mod error;
pub mod tracking_scheduler;

pub use error::{SchedulerError, SchedulerResult};
pub use tracking_scheduler::{TrackingScheduler, TrackingSchedulerConfig};
