//! # SignalKeeper Infrastructure
//!
//! Infrastructure implementations of core domain ports.
//!
//! This crate contains:
//! - Database implementations (SQLite behind an r2d2 pool)
//! - Configuration loading (environment, TOML/JSON files)
//! - Platform foreground-window sources and OS notifications
//! - The tracking scheduler and tracing setup
//!
//! ## Architecture
//! - Implements traits defined in `signalkeeper-core`
//! - Depends on `signalkeeper-domain` and `signalkeeper-core`
//! - Contains all "impure" code (I/O, processes, timers)

pub mod config;
pub mod database;
pub mod errors;
pub mod notifications;
pub mod observability;
pub mod platform;
pub mod scheduling;

// Re-export commonly used items
pub use database::{
    DbManager, SqliteActivitySampleRepository, SqliteDailyStatsRepository, SqliteTaskRepository,
};
pub use errors::InfraError;
pub use notifications::SystemNudgeDispatcher;
pub use observability::init_tracing;
pub use platform::{CommandActivitySource, StaticActivitySource};
pub use scheduling::{SchedulerError, TrackingScheduler, TrackingSchedulerConfig};
