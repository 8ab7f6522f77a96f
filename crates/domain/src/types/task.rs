//! Task records and lifecycle inputs
//!
//! Status changes go through the lifecycle operations in the core task
//! service; [`TaskUpdate`] can only move a deferred task back to pending.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{
    DEFAULT_TASK_PRIORITY, MAX_TASK_PRIORITY, MAX_TASK_TITLE_LENGTH, MIN_TASK_PRIORITY,
};
use crate::impl_wire_enum;
use crate::{Result, SignalKeeperError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Pending,
    InProgress,
    Completed,
    Deferred,
}

impl_wire_enum!(TaskStatus {
    Pending => "pending",
    InProgress => "in_progress",
    Completed => "completed",
    Deferred => "deferred",
});

impl TaskStatus {
    /// Eligible for the backlog view.
    pub fn is_actionable(self) -> bool {
        !matches!(self, Self::Completed | Self::Deferred)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    /// 1 (most urgent) through 5.
    pub priority: u8,
    pub category_id: Option<String>,
    pub scheduled_date: Option<NaiveDate>,
    pub estimated_days: u32,
    pub days_worked: u32,
    pub last_worked_date: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Task {
    /// Worked on more days than estimated. Allowed; only reported.
    pub fn is_overrun(&self) -> bool {
        self.estimated_days > 0 && self.days_worked > self.estimated_days
    }
}

/// Validated input for creating a task.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_days: Option<u32>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self { title: title.into(), ..Self::default() }
    }

    #[must_use]
    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = Some(priority);
        self
    }

    #[must_use]
    pub fn with_category(mut self, category_id: impl Into<String>) -> Self {
        self.category_id = Some(category_id.into());
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_title(&self.title)?;
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        Ok(())
    }

    pub fn priority_or_default(&self) -> u8 {
        self.priority.unwrap_or(DEFAULT_TASK_PRIORITY)
    }
}

/// Partial update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskUpdate {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    /// Only `pending` is accepted, and only for a deferred task.
    #[serde(default)]
    pub status: Option<TaskStatus>,
    #[serde(default)]
    pub priority: Option<u8>,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub scheduled_date: Option<NaiveDate>,
    #[serde(default)]
    pub estimated_days: Option<u32>,
}

impl TaskUpdate {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(title) = &self.title {
            validate_title(title)?;
        }
        if let Some(priority) = self.priority {
            validate_priority(priority)?;
        }
        match self.status {
            None | Some(TaskStatus::Pending) => Ok(()),
            Some(other) => Err(SignalKeeperError::InvalidInput(format!(
                "status '{other}' cannot be set by update; use the start/complete/defer operations"
            ))),
        }
    }

    /// Apply onto an existing record, enforcing the status rules.
    pub fn apply_to(&self, task: &mut Task, now: DateTime<Utc>) -> Result<()> {
        self.validate()?;

        if let Some(status) = self.status {
            if status != task.status {
                if task.status != TaskStatus::Deferred {
                    return Err(SignalKeeperError::InvalidInput(format!(
                        "task '{}' is {}; only deferred tasks can be resumed to pending",
                        task.id, task.status
                    )));
                }
                task.status = status;
            }
        }
        if let Some(title) = &self.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &self.description {
            task.description = Some(description.clone());
        }
        if let Some(priority) = self.priority {
            task.priority = priority;
        }
        if let Some(category_id) = &self.category_id {
            task.category_id = Some(category_id.clone());
        }
        if let Some(date) = self.scheduled_date {
            task.scheduled_date = Some(date);
        }
        if let Some(days) = self.estimated_days {
            task.estimated_days = days;
        }
        task.updated_at = now;
        Ok(())
    }
}

/// Priority must be within `1..=5`.
pub fn validate_priority(priority: u8) -> Result<u8> {
    if (MIN_TASK_PRIORITY..=MAX_TASK_PRIORITY).contains(&priority) {
        Ok(priority)
    } else {
        Err(SignalKeeperError::InvalidInput(format!(
            "priority must be between {MIN_TASK_PRIORITY} and {MAX_TASK_PRIORITY}, got {priority}"
        )))
    }
}

fn validate_title(title: &str) -> Result<()> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(SignalKeeperError::InvalidInput("title must not be empty".into()));
    }
    if trimmed.chars().count() > MAX_TASK_TITLE_LENGTH {
        return Err(SignalKeeperError::InvalidInput(format!(
            "title must be at most {MAX_TASK_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}
