//! In-memory repository doubles

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use parking_lot::Mutex;
use signalkeeper_core::{ActivitySampleRepository, DailyStatsRepository, TaskRepository};
use signalkeeper_domain::{
    ActivitySample, DailyStats, Result as DomainResult, SignalKeeperError, Task, TaskStatus,
};

#[derive(Default)]
pub struct InMemorySampleRepository {
    samples: Mutex<Vec<ActivitySample>>,
    fail_writes: AtomicBool,
}

impl InMemorySampleRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_samples(samples: Vec<ActivitySample>) -> Self {
        Self { samples: Mutex::new(samples), fail_writes: AtomicBool::new(false) }
    }

    pub fn push(&self, sample: ActivitySample) {
        self.samples.lock().push(sample);
    }

    pub fn all(&self) -> Vec<ActivitySample> {
        self.samples.lock().clone()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ActivitySampleRepository for InMemorySampleRepository {
    async fn save_sample(&self, sample: ActivitySample) -> DomainResult<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(SignalKeeperError::Database("disk I/O error".into()));
        }
        self.samples.lock().push(sample);
        Ok(())
    }

    async fn samples_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<ActivitySample>> {
        let mut samples: Vec<ActivitySample> = self
            .samples
            .lock()
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp < end)
            .cloned()
            .collect();
        samples.sort_by_key(|s| s.timestamp);
        Ok(samples)
    }

    async fn delete_samples_before(&self, before: DateTime<Utc>) -> DomainResult<usize> {
        let mut guard = self.samples.lock();
        let len = guard.len();
        guard.retain(|s| s.timestamp >= before);
        Ok(len - guard.len())
    }
}

#[derive(Default)]
pub struct InMemoryDailyStatsRepository {
    rows: Mutex<BTreeMap<NaiveDate, DailyStats>>,
}

impl InMemoryDailyStatsRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, row: DailyStats) {
        self.rows.lock().insert(row.date, row);
    }

    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }
}

#[async_trait]
impl DailyStatsRepository for InMemoryDailyStatsRepository {
    async fn get_day(&self, date: NaiveDate) -> DomainResult<Option<DailyStats>> {
        Ok(self.rows.lock().get(&date).cloned())
    }

    async fn get_range(&self, start: NaiveDate, end: NaiveDate) -> DomainResult<Vec<DailyStats>> {
        Ok(self.rows.lock().range(start..=end).map(|(_, row)| row.clone()).collect())
    }

    async fn latest(&self) -> DomainResult<Option<DailyStats>> {
        Ok(self.rows.lock().values().next_back().cloned())
    }

    async fn latest_before(&self, date: NaiveDate) -> DomainResult<Option<DailyStats>> {
        Ok(self.rows.lock().range(..date).next_back().map(|(_, row)| row.clone()))
    }

    async fn upsert_preserving_streak(&self, stats: DailyStats) -> DomainResult<DailyStats> {
        let mut rows = self.rows.lock();
        let stored = match rows.get(&stats.date) {
            Some(existing) => DailyStats { streak: existing.streak, ..stats },
            None => stats,
        };
        rows.insert(stored.date, stored.clone());
        Ok(stored)
    }
}

#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: Mutex<HashMap<String, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn seed(&self, task: Task) {
        self.tasks.lock().insert(task.id.clone(), task);
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn insert_task(&self, task: Task) -> DomainResult<()> {
        let mut tasks = self.tasks.lock();
        if tasks.contains_key(&task.id) {
            return Err(SignalKeeperError::Database(format!("duplicate task id {}", task.id)));
        }
        tasks.insert(task.id.clone(), task);
        Ok(())
    }

    async fn get_task(&self, id: &str) -> DomainResult<Option<Task>> {
        Ok(self.tasks.lock().get(id).cloned())
    }

    async fn list_tasks(&self, statuses: &[TaskStatus]) -> DomainResult<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .values()
            .filter(|t| statuses.is_empty() || statuses.contains(&t.status))
            .cloned()
            .collect())
    }

    async fn tasks_updated_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Vec<Task>> {
        Ok(self
            .tasks
            .lock()
            .values()
            .filter(|t| t.updated_at >= start && t.updated_at < end)
            .cloned()
            .collect())
    }

    async fn update_task(&self, task: &Task) -> DomainResult<bool> {
        let mut tasks = self.tasks.lock();
        match tasks.get_mut(&task.id) {
            Some(existing) => {
                *existing = task.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete_task(&self, id: &str) -> DomainResult<bool> {
        Ok(self.tasks.lock().remove(id).is_some())
    }
}
