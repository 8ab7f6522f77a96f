//! Task lifecycle service - core business logic
//!
//! Lifecycle: `pending -> in_progress -> completed`, with `deferred` as a
//! parking state that only an explicit update moves back to `pending`.
//! Every mutation validates input, checks the row exists, then writes the
//! whole record in one statement (last writer wins).

use std::sync::Arc;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use signalkeeper_domain::constants::{DEFAULT_BACKLOG_LIMIT, DEFAULT_SIGNAL_QUEUE_LIMIT};
use signalkeeper_domain::utils::dates::local_date_of;
use signalkeeper_domain::{
    NewTask, Result, SignalKeeperError, Task, TaskStatus, TaskUpdate,
};
use tracing::{debug, info};
use uuid::Uuid;

use super::ports::TaskRepository;
use super::queue::{backlog, signal_queue, validate_limit};

/// Task lifecycle service
pub struct TaskService {
    repository: Arc<dyn TaskRepository>,
}

impl TaskService {
    /// Create a new task service
    pub fn new(repository: Arc<dyn TaskRepository>) -> Self {
        Self { repository }
    }

    pub async fn create(&self, input: NewTask) -> Result<Task> {
        self.create_at(input, Utc::now()).await
    }

    /// Validate and store a new pending task.
    pub async fn create_at(&self, input: NewTask, now: DateTime<Utc>) -> Result<Task> {
        input.validate()?;

        let task = Task {
            id: Uuid::now_v7().to_string(),
            title: input.title.trim().to_string(),
            description: input.description.clone(),
            status: TaskStatus::Pending,
            priority: input.priority_or_default(),
            category_id: input.category_id.clone(),
            scheduled_date: input.scheduled_date,
            estimated_days: input.estimated_days.unwrap_or(1),
            days_worked: 0,
            last_worked_date: None,
            created_at: now,
            updated_at: now,
        };

        self.repository.insert_task(task.clone()).await?;
        info!(task_id = %task.id, priority = task.priority, "Task created");
        Ok(task)
    }

    /// # Errors
    /// `NotFound` when no task has this id.
    pub async fn get(&self, id: &str) -> Result<Task> {
        let id = validate_id(id)?;
        self.repository.get_task(id).await?.ok_or_else(|| SignalKeeperError::task_not_found(id))
    }

    pub async fn update(&self, id: &str, update: TaskUpdate) -> Result<Task> {
        self.update_at(id, update, Utc::now()).await
    }

    /// Apply a partial update. Only a deferred task may be moved back to
    /// pending here; other status changes go through start/complete/defer.
    pub async fn update_at(&self, id: &str, update: TaskUpdate, now: DateTime<Utc>) -> Result<Task> {
        if update.is_empty() {
            return Err(SignalKeeperError::InvalidInput("update contains no fields".into()));
        }
        update.validate()?;

        let mut task = self.get(id).await?;
        let resumed = task.status == TaskStatus::Deferred && update.status == Some(TaskStatus::Pending);
        update.apply_to(&mut task, now)?;
        self.write(&task).await?;

        debug!(task_id = %task.id, resumed, "Task updated");
        Ok(task)
    }

    pub async fn start(&self, id: &str) -> Result<Task> {
        self.start_at(id, Utc::now()).await
    }

    /// Move to `in_progress`. `days_worked` grows once per distinct local
    /// day the task is started on.
    pub async fn start_at(&self, id: &str, now: DateTime<Utc>) -> Result<Task> {
        let mut task = self.get(id).await?;
        match task.status {
            TaskStatus::Pending | TaskStatus::InProgress => {}
            TaskStatus::Completed => return Err(invalid_transition(&task, "start")),
            TaskStatus::Deferred => {
                return Err(SignalKeeperError::InvalidInput(format!(
                    "task '{}' is deferred; resume it to pending with an update first",
                    task.id
                )))
            }
        }

        let today = local_date_of(now);
        if task.last_worked_date != Some(today) {
            task.days_worked = task.days_worked.saturating_add(1);
            task.last_worked_date = Some(today);
        }
        task.status = TaskStatus::InProgress;
        task.updated_at = now;
        self.write(&task).await?;

        info!(
            task_id = %task.id,
            days_worked = task.days_worked,
            overrun = task.is_overrun(),
            "Task started"
        );
        Ok(task)
    }

    pub async fn complete(&self, id: &str) -> Result<Task> {
        self.complete_at(id, Utc::now()).await
    }

    /// Mark completed. Completing an already completed task is a no-op so its
    /// completion date stays put.
    pub async fn complete_at(&self, id: &str, now: DateTime<Utc>) -> Result<Task> {
        let mut task = self.get(id).await?;
        match task.status {
            TaskStatus::Completed => return Ok(task),
            TaskStatus::Deferred => return Err(invalid_transition(&task, "complete")),
            TaskStatus::Pending | TaskStatus::InProgress => {}
        }

        task.status = TaskStatus::Completed;
        task.updated_at = now;
        self.write(&task).await?;

        info!(task_id = %task.id, days_worked = task.days_worked, "Task completed");
        Ok(task)
    }

    pub async fn defer(&self, id: &str, until: Option<NaiveDate>) -> Result<Task> {
        self.defer_at(id, until, Utc::now()).await
    }

    /// Park the task until `until` (default: tomorrow). The date must be in
    /// the future.
    pub async fn defer_at(
        &self,
        id: &str,
        until: Option<NaiveDate>,
        now: DateTime<Utc>,
    ) -> Result<Task> {
        let today = local_date_of(now);
        let until = until.unwrap_or(today + Duration::days(1));
        if until <= today {
            return Err(SignalKeeperError::InvalidInput(format!(
                "defer date {until} must be after today ({today})"
            )));
        }

        let mut task = self.get(id).await?;
        if task.status == TaskStatus::Completed {
            return Err(invalid_transition(&task, "defer"));
        }

        task.status = TaskStatus::Deferred;
        task.scheduled_date = Some(until);
        task.updated_at = now;
        self.write(&task).await?;

        info!(task_id = %task.id, until = %until, "Task deferred");
        Ok(task)
    }

    /// Idempotent: returns `false` when nothing was deleted.
    pub async fn delete(&self, id: &str) -> Result<bool> {
        let id = validate_id(id)?;
        let deleted = self.repository.delete_task(id).await?;
        debug!(task_id = id, deleted, "Task delete requested");
        Ok(deleted)
    }

    /// Up to `limit` (default 5) tasks to work on next.
    pub async fn signal_queue(&self, limit: Option<usize>) -> Result<Vec<Task>> {
        let limit = validate_limit(limit, DEFAULT_SIGNAL_QUEUE_LIMIT)?;
        let tasks =
            self.repository.list_tasks(&[TaskStatus::InProgress, TaskStatus::Pending]).await?;
        Ok(signal_queue(tasks, limit))
    }

    /// Up to `limit` (default 50) actionable tasks, optionally in one category.
    pub async fn backlog(&self, category_id: Option<&str>, limit: Option<usize>) -> Result<Vec<Task>> {
        let limit = validate_limit(limit, DEFAULT_BACKLOG_LIMIT)?;
        let category_id = category_id.map(str::trim).filter(|c| !c.is_empty());
        let tasks =
            self.repository.list_tasks(&[TaskStatus::InProgress, TaskStatus::Pending]).await?;
        Ok(backlog(tasks, category_id, limit))
    }

    async fn write(&self, task: &Task) -> Result<()> {
        if self.repository.update_task(task).await? {
            Ok(())
        } else {
            Err(SignalKeeperError::task_not_found(&task.id))
        }
    }
}

fn validate_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        return Err(SignalKeeperError::InvalidInput("task id must not be empty".into()));
    }
    Ok(id)
}

fn invalid_transition(task: &Task, action: &str) -> SignalKeeperError {
    SignalKeeperError::InvalidInput(format!(
        "cannot {action} task '{}' while it is {}",
        task.id, task.status
    ))
}
