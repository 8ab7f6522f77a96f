//! SQLite-backed task repository.
//!
//! Every write is a single statement. `update_task` rewrites the whole row and
//! reports whether it existed; lifecycle rules live in the core task service.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row};
use signalkeeper_core::TaskRepository as TaskRepositoryPort;
use signalkeeper_domain::utils::dates::DATE_FORMAT;
use signalkeeper_domain::{Result as DomainResult, SignalKeeperError, Task, TaskStatus};
use tokio::task;
use tracing::debug;

use super::activity_repository::millis_to_utc;
use super::daily_stats_repository::date_key;
use super::manager::{map_join_error, map_sql_error, DbManager};

const TASK_COLUMNS: &str = "id, title, description, status, priority, category_id, \
     scheduled_date, estimated_days, days_worked, last_worked_date, created_at, updated_at";

pub struct SqliteTaskRepository {
    db: Arc<DbManager>,
}

impl SqliteTaskRepository {
    pub fn new(db: Arc<DbManager>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskRepositoryPort for SqliteTaskRepository {
    async fn insert_task(&self, task: Task) -> DomainResult<()> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<()> {
            let conn = db.get_connection()?;
            insert(&conn, &task).map_err(map_sql_error)?;
            debug!(task_id = %task.id, "task row inserted");
            Ok(())
        })
        .await
        .map_err(map_join_error)?
    }

    async fn get_task(&self, id: &str) -> DomainResult<Option<Task>> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> DomainResult<Option<Task>> {
            let conn = db.get_connection()?;
            conn.query_row(
                &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = ?1"),
                params![id],
                read_row,
            )
            .optional()
            .map_err(map_sql_error)?
            .map(row_to_task)
            .transpose()
        })
        .await
        .map_err(map_join_error)?
    }

    async fn list_tasks(&self, statuses: &[TaskStatus]) -> DomainResult<Vec<Task>> {
        let db = Arc::clone(&self.db);
        let statuses: Vec<&'static str> = statuses.iter().map(TaskStatus::as_str).collect();
        task::spawn_blocking(move || -> DomainResult<Vec<Task>> {
            let conn = db.get_connection()?;
            let sql = if statuses.is_empty() {
                format!("SELECT {TASK_COLUMNS} FROM tasks ORDER BY created_at ASC")
            } else {
                let placeholders = vec!["?"; statuses.len()].join(", ");
                format!(
                    "SELECT {TASK_COLUMNS} FROM tasks WHERE status IN ({placeholders}) \
                     ORDER BY created_at ASC"
                )
            };
            query_tasks(&conn, &sql, params_from_iter(statuses.iter()))
        })
        .await
        .map_err(map_join_error)?
    }

    async fn tasks_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Task>> {
        let db = Arc::clone(&self.db);
        task::spawn_blocking(move || -> DomainResult<Vec<Task>> {
            let conn = db.get_connection()?;
            query_tasks(
                &conn,
                &format!(
                    "SELECT {TASK_COLUMNS} FROM tasks \
                     WHERE updated_at >= ?1 AND updated_at < ?2 ORDER BY updated_at ASC"
                ),
                params![start.timestamp_millis(), end.timestamp_millis()],
            )
        })
        .await
        .map_err(map_join_error)?
    }

    async fn update_task(&self, task: &Task) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let task = task.clone();
        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let changed = update(&conn, &task).map_err(map_sql_error)?;
            Ok(changed > 0)
        })
        .await
        .map_err(map_join_error)?
    }

    async fn delete_task(&self, id: &str) -> DomainResult<bool> {
        let db = Arc::clone(&self.db);
        let id = id.to_string();
        task::spawn_blocking(move || -> DomainResult<bool> {
            let conn = db.get_connection()?;
            let deleted =
                conn.execute("DELETE FROM tasks WHERE id = ?1", params![id]).map_err(map_sql_error)?;
            Ok(deleted > 0)
        })
        .await
        .map_err(map_join_error)?
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn insert(conn: &Connection, task: &Task) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO tasks ({TASK_COLUMNS}) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
        ),
        params![
            task.id,
            task.title,
            task.description,
            task.status.as_str(),
            task.priority,
            task.category_id,
            task.scheduled_date.map(date_key),
            task.estimated_days,
            task.days_worked,
            task.last_worked_date.map(date_key),
            task.created_at.timestamp_millis(),
            task.updated_at.timestamp_millis(),
        ],
    )
}

fn update(conn: &Connection, task: &Task) -> rusqlite::Result<usize> {
    conn.execute(
        "UPDATE tasks SET
            title = ?2, description = ?3, status = ?4, priority = ?5, category_id = ?6,
            scheduled_date = ?7, estimated_days = ?8, days_worked = ?9,
            last_worked_date = ?10, updated_at = ?11
         WHERE id = ?1",
        params![
            task.id,
            task.title,
            task.description,
            task.status.as_str(),
            task.priority,
            task.category_id,
            task.scheduled_date.map(date_key),
            task.estimated_days,
            task.days_worked,
            task.last_worked_date.map(date_key),
            task.updated_at.timestamp_millis(),
        ],
    )
}

fn query_tasks<P: rusqlite::Params>(
    conn: &Connection,
    sql: &str,
    params: P,
) -> DomainResult<Vec<Task>> {
    let mut stmt = conn.prepare(sql).map_err(map_sql_error)?;
    let rows = stmt.query_map(params, read_row).map_err(map_sql_error)?;
    let mut tasks = Vec::new();
    for row in rows {
        tasks.push(row_to_task(row.map_err(map_sql_error)?)?);
    }
    Ok(tasks)
}

struct TaskRow {
    id: String,
    title: String,
    description: Option<String>,
    status: String,
    priority: u8,
    category_id: Option<String>,
    scheduled_date: Option<String>,
    estimated_days: u32,
    days_worked: u32,
    last_worked_date: Option<String>,
    created_at: i64,
    updated_at: i64,
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<TaskRow> {
    Ok(TaskRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        status: row.get(3)?,
        priority: row.get(4)?,
        category_id: row.get(5)?,
        scheduled_date: row.get(6)?,
        estimated_days: row.get(7)?,
        days_worked: row.get(8)?,
        last_worked_date: row.get(9)?,
        created_at: row.get(10)?,
        updated_at: row.get(11)?,
    })
}

fn row_to_task(row: TaskRow) -> DomainResult<Task> {
    let status: TaskStatus = row.status.parse().map_err(|_| {
        SignalKeeperError::Database(format!("task {} has status '{}'", row.id, row.status))
    })?;
    Ok(Task {
        status,
        priority: row.priority,
        scheduled_date: parse_optional_date(row.scheduled_date.as_deref())?,
        last_worked_date: parse_optional_date(row.last_worked_date.as_deref())?,
        created_at: millis_to_utc(row.created_at)?,
        updated_at: millis_to_utc(row.updated_at)?,
        id: row.id,
        title: row.title,
        description: row.description,
        category_id: row.category_id,
        estimated_days: row.estimated_days,
        days_worked: row.days_worked,
    })
}

fn parse_optional_date(value: Option<&str>) -> DomainResult<Option<NaiveDate>> {
    value
        .map(|raw| {
            NaiveDate::parse_from_str(raw, DATE_FORMAT).map_err(|e| {
                SignalKeeperError::Database(format!("tasks has malformed date '{raw}': {e}"))
            })
        })
        .transpose()
}
