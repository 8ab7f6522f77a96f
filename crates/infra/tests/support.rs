//! Shared fixtures for infra integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use signalkeeper_core::{EventHub, ScoreService, TaskService, TrackingEngine};
use signalkeeper_domain::NudgeConfig;
use signalkeeper_infra::database::{
    DbManager, SqliteActivitySampleRepository, SqliteDailyStatsRepository, SqliteTaskRepository,
};
use signalkeeper_infra::StaticActivitySource;
use tempfile::TempDir;

/// Temporary database wrapper that keeps the underlying file alive for the
/// duration of a test run.
pub struct TestDatabase {
    pub manager: Arc<DbManager>,
    _temp_dir: TempDir,
}

impl TestDatabase {
    /// Create a new temporary database with migrations applied.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir should be created");
        let db_path = temp_dir.path().join("test.db");

        let manager = DbManager::new(&db_path, 4).expect("db manager should be created");
        manager.run_migrations().expect("migrations should apply");

        Self { manager: Arc::new(manager), _temp_dir: temp_dir }
    }

    /// Execute a batch of SQL statements against the database.
    pub fn execute_batch(&self, sql: &str) {
        let conn = self
            .manager
            .get_connection()
            .expect("connection should be available for execute_batch");
        conn.execute_batch(sql).expect("SQL batch execution should succeed");
    }

    pub fn samples(&self) -> Arc<SqliteActivitySampleRepository> {
        Arc::new(SqliteActivitySampleRepository::new(Arc::clone(&self.manager)))
    }

    pub fn stats(&self) -> Arc<SqliteDailyStatsRepository> {
        Arc::new(SqliteDailyStatsRepository::new(Arc::clone(&self.manager)))
    }

    pub fn tasks(&self) -> Arc<SqliteTaskRepository> {
        Arc::new(SqliteTaskRepository::new(Arc::clone(&self.manager)))
    }

    pub fn score_service(&self) -> Arc<ScoreService> {
        Arc::new(ScoreService::new(self.samples(), self.stats(), self.tasks()))
    }

    pub fn task_service(&self) -> TaskService {
        TaskService::new(self.tasks())
    }

    /// Engine reading from `source`, persisting into this database.
    pub fn engine(&self, source: StaticActivitySource, nudge: NudgeConfig) -> (TrackingEngine, Arc<EventHub>) {
        let hub = Arc::new(EventHub::new());
        let engine = TrackingEngine::new(Arc::new(source), self.samples(), Arc::clone(&hub))
            .with_nudge_config(nudge);
        (engine, hub)
    }
}

impl Default for TestDatabase {
    fn default() -> Self {
        Self::new()
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// Local wall-clock instant on `day`, as UTC.
pub fn local_at(day: NaiveDate, hour: u32, minute: u32) -> DateTime<Utc> {
    let naive = day.and_hms_opt(hour, minute, 0).expect("valid time");
    Local
        .from_local_datetime(&naive)
        .earliest()
        .expect("local time exists")
        .with_timezone(&Utc)
}
