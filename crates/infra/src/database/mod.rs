//! Database implementations

pub mod activity_repository;
pub mod daily_stats_repository;
pub mod manager;
pub mod task_repository;

pub use activity_repository::SqliteActivitySampleRepository;
pub use daily_stats_repository::SqliteDailyStatsRepository;
pub use manager::{DbConnection, DbManager, SCHEMA_VERSION};
pub use task_repository::SqliteTaskRepository;
