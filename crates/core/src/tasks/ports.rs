//! Port interfaces for task storage

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use signalkeeper_domain::{Result, Task, TaskStatus};

#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn insert_task(&self, task: Task) -> Result<()>;

    async fn get_task(&self, id: &str) -> Result<Option<Task>>;

    /// Tasks whose status is in `statuses`; an empty slice means every
    /// status. No particular order.
    async fn list_tasks(&self, statuses: &[TaskStatus]) -> Result<Vec<Task>>;

    /// Tasks with `start <= updated_at < end`.
    async fn tasks_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Task>>;

    /// Overwrite the stored row in one statement. Returns `false` if no row
    /// has that id.
    async fn update_task(&self, task: &Task) -> Result<bool>;

    /// Returns `false` if no row has that id.
    async fn delete_task(&self, id: &str) -> Result<bool>;
}
