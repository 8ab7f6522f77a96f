//! Signal queue and backlog projections
//!
//! Both are read-only views over stored tasks; neither is persisted.

use std::cmp::Ordering;

use signalkeeper_domain::constants::MAX_QUERY_LIMIT;
use signalkeeper_domain::{Result, SignalKeeperError, Task, TaskStatus};

/// In-progress before pending, then priority ascending, then oldest first.
///
/// ```
/// # use chrono::{Duration, Utc};
/// # use signalkeeper_core::tasks::signal_queue;
/// # use signalkeeper_domain::{Task, TaskStatus};
/// # let base = Utc::now();
/// # let task = |id: &str, status, priority, age: i64| Task {
/// #     id: id.into(), title: id.into(), description: None, status, priority,
/// #     category_id: None, scheduled_date: None, estimated_days: 0, days_worked: 0,
/// #     last_worked_date: None, created_at: base - Duration::minutes(age), updated_at: base,
/// # };
/// let tasks = vec![
///     task("a", TaskStatus::Pending, 3, 3),
///     task("b", TaskStatus::InProgress, 5, 2),
///     task("c", TaskStatus::Pending, 1, 1),
/// ];
/// let ids: Vec<_> = signal_queue(tasks, 5).into_iter().map(|t| t.id).collect();
/// assert_eq!(ids, ["b", "c", "a"]);
/// ```
pub fn signal_queue(tasks: Vec<Task>, limit: usize) -> Vec<Task> {
    let mut queue: Vec<Task> = tasks
        .into_iter()
        .filter(|t| matches!(t.status, TaskStatus::InProgress | TaskStatus::Pending))
        .collect();
    queue.sort_by(|a, b| {
        status_rank(a.status)
            .cmp(&status_rank(b.status))
            .then_with(|| by_priority_then_age(a, b))
    });
    queue.truncate(limit);
    queue
}

/// Everything not completed or deferred, optionally limited to one category,
/// ordered by priority then age.
pub fn backlog(tasks: Vec<Task>, category_id: Option<&str>, limit: usize) -> Vec<Task> {
    let mut backlog: Vec<Task> = tasks
        .into_iter()
        .filter(|t| t.status.is_actionable())
        .filter(|t| category_id.map_or(true, |c| t.category_id.as_deref() == Some(c)))
        .collect();
    backlog.sort_by(by_priority_then_age);
    backlog.truncate(limit);
    backlog
}

/// Resolve an optional caller limit against a default.
///
/// # Errors
/// Returns `SignalKeeperError::InvalidInput` for zero or anything above
/// the query cap.
pub fn validate_limit(limit: Option<usize>, default: usize) -> Result<usize> {
    match limit {
        None => Ok(default),
        Some(n) if (1..=MAX_QUERY_LIMIT).contains(&n) => Ok(n),
        Some(n) => Err(SignalKeeperError::InvalidInput(format!(
            "limit must be between 1 and {MAX_QUERY_LIMIT}, got {n}"
        ))),
    }
}

fn status_rank(status: TaskStatus) -> u8 {
    match status {
        TaskStatus::InProgress => 0,
        _ => 1,
    }
}

fn by_priority_then_age(a: &Task, b: &Task) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.created_at.cmp(&b.created_at))
        .then_with(|| a.id.cmp(&b.id))
}
