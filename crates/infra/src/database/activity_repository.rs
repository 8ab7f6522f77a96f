//! SQLite-backed activity sample repository.
//!
//! Rows are only ever inserted whole, once a sample is finalized, so readers
//! never observe an in-flight sample.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use rusqlite::{params, Connection, Row};
use signalkeeper_core::ActivitySampleRepository as ActivitySampleRepositoryPort;
use signalkeeper_domain::{
    ActivitySample, ProductivityState, Result as DomainResult, SignalKeeperError,
};
use tokio::task;
use tracing::debug;

use super::manager::{map_join_error, map_sql_error, DbManager};

const SAMPLE_COLUMNS: &str = "id, app_name, window_title, state, duration_seconds, timestamp";

/// `activity_logs` table access.
pub struct SqliteActivitySampleRepository {
    db: Arc<DbManager>,
}

impl SqliteActivitySampleRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ActivitySampleRepositoryPort for SqliteActivitySampleRepository {
    async fn save_sample(&self, sample: ActivitySample) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert_sample(&conn, &sample).map_err(map_sql_error)?;
            debug!(
                sample_id = %sample.id,
                app = %sample.app_name,
                state = %sample.state,
                duration_seconds = sample.duration_seconds,
                "activity sample stored"
            );
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn samples_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<ActivitySample>> {
        if start >= end {
            return Ok(Vec::new());
        }
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<Vec<ActivitySample>> {
            let conn = db.get_connection()?;
            query_samples(&conn, start.timestamp_millis(), end.timestamp_millis())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_samples_before(&self, before: DateTime<Utc>) -> DomainResult<usize> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<usize> {
            let conn = db.get_connection()?;
            conn.execute(
                "DELETE FROM activity_logs WHERE timestamp < ?1",
                params![before.timestamp_millis()],
            )
            .map_err(map_sql_error)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn insert_sample(conn: &Connection, sample: &ActivitySample) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT INTO activity_logs (id, app_name, window_title, state, duration_seconds, timestamp)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            sample.id,
            sample.app_name,
            sample.window_title,
            sample.state.as_str(),
            sample.duration_seconds,
            sample.timestamp.timestamp_millis(),
        ],
    )?;
    Ok(())
}

fn query_samples(conn: &Connection, start_ms: i64, end_ms: i64) -> DomainResult<Vec<ActivitySample>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT {SAMPLE_COLUMNS} FROM activity_logs
             WHERE timestamp >= ?1 AND timestamp < ?2
             ORDER BY timestamp ASC, id ASC"
        ))
        .map_err(map_sql_error)?;

    let rows = stmt.query_map(params![start_ms, end_ms], read_row).map_err(map_sql_error)?;
    let mut samples = Vec::new();
    for row in rows {
        samples.push(row_to_sample(row.map_err(map_sql_error)?)?);
    }
    Ok(samples)
}

struct SampleRow {
    id: String,
    app_name: String,
    window_title: String,
    state: String,
    duration_seconds: i64,
    timestamp_ms: i64,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<SampleRow> {
    Ok(SampleRow {
        id: row.get(0)?,
        app_name: row.get(1)?,
        window_title: row.get(2)?,
        state: row.get(3)?,
        duration_seconds: row.get(4)?,
        timestamp_ms: row.get(5)?,
    })
}

fn row_to_sample(row: SampleRow) -> DomainResult<ActivitySample> {
    let state: ProductivityState = row.state.parse().map_err(|_| {
        SignalKeeperError::Database(format!("activity_logs row {} has state '{}'", row.id, row.state))
    })?;
    Ok(ActivitySample {
        timestamp: millis_to_utc(row.timestamp_ms)?,
        id: row.id,
        app_name: row.app_name,
        window_title: row.window_title,
        state,
        duration_seconds: row.duration_seconds,
    })
}

pub(crate) fn millis_to_utc(millis: i64) -> DomainResult<DateTime<Utc>> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| SignalKeeperError::Database(format!("timestamp {millis} is out of range")))
}

// =============================================================================
// Tests
// =============================================================================
