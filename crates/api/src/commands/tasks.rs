//! Task queue and lifecycle commands

use chrono::NaiveDate;
use signalkeeper_domain::{NewTask, Result, Task, TaskUpdate};
use tracing::info;

use crate::utils::command_helpers::execute_command;
use crate::AppContext;

/// Tasks to work on next (default limit 5).
pub async fn task_signal_queue(ctx: &AppContext, limit: Option<usize>) -> Result<Vec<Task>> {
    execute_command("tasks::signal_queue", ctx.tasks.signal_queue(limit)).await
}

/// Everything still actionable (default limit 50).
pub async fn task_backlog(
    ctx: &AppContext,
    category_id: Option<&str>,
    limit: Option<usize>,
) -> Result<Vec<Task>> {
    execute_command("tasks::backlog", ctx.tasks.backlog(category_id, limit)).await
}

pub async fn task_create(ctx: &AppContext, input: NewTask) -> Result<Task> {
    execute_command("tasks::create", async {
        let result = ctx.tasks.create(input).await;
        if let Ok(task) = &result {
            info!(task_id = %task.id, priority = task.priority, "Task created");
        }
        result
    })
    .await
}

pub async fn task_get(ctx: &AppContext, id: &str) -> Result<Task> {
    execute_command("tasks::get", ctx.tasks.get(id)).await
}

pub async fn task_update(ctx: &AppContext, id: &str, update: TaskUpdate) -> Result<Task> {
    execute_command("tasks::update", ctx.tasks.update(id, update)).await
}

pub async fn task_start(ctx: &AppContext, id: &str) -> Result<Task> {
    execute_command("tasks::start", ctx.tasks.start(id)).await
}

pub async fn task_complete(ctx: &AppContext, id: &str) -> Result<Task> {
    execute_command("tasks::complete", ctx.tasks.complete(id)).await
}

/// Defer until `until` (default tomorrow).
pub async fn task_defer(ctx: &AppContext, id: &str, until: Option<NaiveDate>) -> Result<Task> {
    execute_command("tasks::defer", ctx.tasks.defer(id, until)).await
}

/// Returns whether a task was removed.
pub async fn task_delete(ctx: &AppContext, id: &str) -> Result<bool> {
    execute_command("tasks::delete", ctx.tasks.delete(id)).await
}
