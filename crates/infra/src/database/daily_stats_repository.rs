//! SQLite-backed `daily_stats` repository.
//!
//! Dates are stored as `YYYY-MM-DD` text so lexical order is calendar order.
//! The upsert refreshes minutes, score and task count but never rewrites an
//! existing row's streak.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use signalkeeper_core::DailyStatsRepository as DailyStatsRepositoryPort;
use signalkeeper_domain::utils::dates::DATE_FORMAT;
use signalkeeper_domain::{DailyStats, Result as DomainResult, SignalKeeperError};
use tokio::task;
use tracing::debug;

use super::manager::{map_join_error, map_sql_error, DbManager};

const STATS_COLUMNS: &str =
    "date, green_minutes, amber_minutes, red_minutes, signal_score, tasks_completed, streak";

pub struct SqliteDailyStatsRepository {
    db: Arc<DbManager>,
}

impl SqliteDailyStatsRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }

    async fn query_optional(
        &self,
        sql: String,
        date: Option<NaiveDate>,
    ) -> DomainResult<Option<DailyStats>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<Option<DailyStats>> {
            let conn = db.get_connection()?;
            let row = match date {
                Some(date) => conn
                    .query_row(&sql, params![date_key(date)], read_row)
                    .optional(),
                None => conn.query_row(&sql, [], read_row).optional(),
            }
            .map_err(map_sql_error)?;
            row.map(row_to_stats).transpose()
        })
        .await
        .map_err(map_join_error)?
    }
}

#[async_trait]
impl DailyStatsRepositoryPort for SqliteDailyStatsRepository {
    async fn get_day(&self, date: NaiveDate) -> DomainResult<Option<DailyStats>> {
        self.query_optional(
            format!("SELECT {STATS_COLUMNS} FROM daily_stats WHERE date = ?1"),
            Some(date),
        )
        .await
    }

    async fn get_range(&self, start: NaiveDate, end: NaiveDate) -> DomainResult<Vec<DailyStats>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<Vec<DailyStats>> {
            let conn = db.get_connection()?;
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT {STATS_COLUMNS} FROM daily_stats
                     WHERE date >= ?1 AND date <= ?2
                     ORDER BY date ASC"
                ))
                .map_err(map_sql_error)?;
            let rows = stmt
                .query_map(params![date_key(start), date_key(end)], read_row)
                .map_err(map_sql_error)?;

            let mut stats = Vec::new();
            for row in rows {
                stats.push(row_to_stats(row.map_err(map_sql_error)?)?);
            }
            Ok(stats)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn latest(&self) -> DomainResult<Option<DailyStats>> {
        self.query_optional(
            format!("SELECT {STATS_COLUMNS} FROM daily_stats ORDER BY date DESC LIMIT 1"),
            None,
        )
        .await
    }

    async fn latest_before(&self, date: NaiveDate) -> DomainResult<Option<DailyStats>> {
        self.query_optional(
            format!(
                "SELECT {STATS_COLUMNS} FROM daily_stats WHERE date < ?1 ORDER BY date DESC LIMIT 1"
            ),
            Some(date),
        )
        .await
    }

    async fn upsert_preserving_streak(&self, stats: DailyStats) -> DomainResult<DailyStats> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<DailyStats> {
            let conn = db.get_connection()?;
            upsert(&conn, &stats).map_err(map_sql_error)?;
            let stored = conn
                .query_row(
                    &format!("SELECT {STATS_COLUMNS} FROM daily_stats WHERE date = ?1"),
                    params![date_key(stats.date)],
                    read_row,
                )
                .map_err(map_sql_error)?;
            let stored = row_to_stats(stored)?;
            debug!(date = %stored.date, streak = stored.streak, "daily stats upserted");
            Ok(stored)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn upsert(conn: &Connection, stats: &DailyStats) -> rusqlite::Result<usize> {
    conn.execute(
        "INSERT INTO daily_stats (
            date, green_minutes, amber_minutes, red_minutes, signal_score,
            tasks_completed, streak, updated_at
         ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
         ON CONFLICT(date) DO UPDATE SET
            green_minutes = excluded.green_minutes,
            amber_minutes = excluded.amber_minutes,
            red_minutes = excluded.red_minutes,
            signal_score = excluded.signal_score,
            tasks_completed = excluded.tasks_completed,
            updated_at = excluded.updated_at",
        params![
            date_key(stats.date),
            stats.green_minutes,
            stats.amber_minutes,
            stats.red_minutes,
            stats.signal_score,
            stats.tasks_completed,
            stats.streak,
            Utc::now().timestamp_millis(),
        ],
    )
}

struct StatsRow {
    date: String,
    green_minutes: u32,
    amber_minutes: u32,
    red_minutes: u32,
    signal_score: u8,
    tasks_completed: u32,
    streak: u32,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<StatsRow> {
    Ok(StatsRow {
        date: row.get(0)?,
        green_minutes: row.get(1)?,
        amber_minutes: row.get(2)?,
        red_minutes: row.get(3)?,
        signal_score: row.get(4)?,
        tasks_completed: row.get(5)?,
        streak: row.get(6)?,
    })
}

fn row_to_stats(row: StatsRow) -> DomainResult<DailyStats> {
    let date = NaiveDate::parse_from_str(&row.date, DATE_FORMAT).map_err(|e| {
        SignalKeeperError::Database(format!("daily_stats has malformed date '{}': {e}", row.date))
    })?;
    Ok(DailyStats {
        date,
        green_minutes: row.green_minutes,
        amber_minutes: row.amber_minutes,
        red_minutes: row.red_minutes,
        signal_score: row.signal_score,
        tasks_completed: row.tasks_completed,
        streak: row.streak,
    })
}

pub(crate) fn date_key(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup_test_db() -> (Arc<DbManager>, TempDir) {
        let temp_dir = TempDir::new().expect("create temp dir");
        let manager = DbManager::new(temp_dir.path().join("test.db"), 2).expect("create manager");
        manager.run_migrations().expect("run migrations");
        (Arc::new(manager), temp_dir)
    }

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    fn stats(day: u32, score: u8, streak: u32) -> DailyStats {
        DailyStats {
            date: date(day),
            green_minutes: 40,
            amber_minutes: 10,
            red_minutes: 10,
            signal_score: score,
            tasks_completed: 2,
            streak,
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn upsert_keeps_first_streak() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteDailyStatsRepository::new(db);

        let first = repo.upsert_preserving_streak(stats(5, 75, 3)).await.unwrap();
        assert_eq!(first.streak, 3);

        let mut changed = stats(5, 40, 0);
        changed.red_minutes = 90;
        let second = repo.upsert_preserving_streak(changed).await.unwrap();
        assert_eq!(second.signal_score, 40);
        assert_eq!(second.red_minutes, 90);
        assert_eq!(second.streak, 3);

        assert_eq!(repo.get_day(date(5)).await.unwrap(), Some(second));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn latest_queries() {
        let (db, _temp_dir) = setup_test_db();
        let repo = SqliteDailyStatsRepository::new(db);
        assert!(repo.latest().await.unwrap().is_none());

        for (day, streak) in [(3, 1), (4, 2), (9, 1)] {
            repo.upsert_preserving_streak(stats(day, 80, streak)).await.unwrap();
        }

        assert_eq!(repo.latest().await.unwrap().unwrap().date, date(9));
        assert_eq!(repo.latest_before(date(9)).await.unwrap().unwrap().date, date(4));
        assert!(repo.latest_before(date(3)).await.unwrap().is_none());

        let range = repo.get_range(date(4), date(9)).await.unwrap();
        let dates: Vec<NaiveDate> = range.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![date(4), date(9)]);
    }

    #[test]
    fn date_keys_sort_like_dates() {
        assert_eq!(date_key(date(5)), "2024-03-05");
        assert!(date_key(date(9)) < date_key(NaiveDate::from_ymd_opt(2024, 10, 1).unwrap()));
    }
}
