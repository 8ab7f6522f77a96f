//! Application context - dependency injection container

use std::sync::Arc;
use std::time::Duration;

use signalkeeper_core::{
    ActivitySource, EventHub, NudgeDispatcher, ScoreService, StateClassifier, TaskService,
    TrackingEngine,
};
use signalkeeper_domain::{Config, Result};
use signalkeeper_infra::config;
use signalkeeper_infra::{
    CommandActivitySource, DbManager, SqliteActivitySampleRepository, SqliteDailyStatsRepository,
    SqliteTaskRepository, SystemNudgeDispatcher, TrackingScheduler, TrackingSchedulerConfig,
};
use tracing::info;

/// Application context - holds all services and dependencies
pub struct AppContext {
    pub config: Config,
    pub db: Arc<DbManager>,
    pub samples: Arc<SqliteActivitySampleRepository>,
    pub scores: Arc<ScoreService>,
    pub tasks: Arc<TaskService>,
    pub events: Arc<EventHub>,
    pub tracking: Arc<TrackingScheduler>,
}

impl AppContext {
    /// Load configuration and wire the platform adapters.
    pub fn new() -> Result<Self> {
        let config = config::load()?;
        Self::from_config(config)
    }

    /// Wire the context with the command-based activity source and system
    /// notifications.
    pub fn from_config(config: Config) -> Result<Self> {
        let source = CommandActivitySource::new(Duration::from_millis(
            config.tracking.source_timeout_ms,
        ));
        let dispatcher = SystemNudgeDispatcher::new(config.nudge.show_system_notifications);
        Self::with_adapters(config, Arc::new(source), Some(Arc::new(dispatcher)))
    }

    /// Wire the context around the given activity source and dispatcher.
    ///
    /// Opens the database and applies migrations; the tracking loop is not
    /// started until [`AppContext::start`].
    pub fn with_adapters(
        config: Config,
        source: Arc<dyn ActivitySource>,
        dispatcher: Option<Arc<dyn NudgeDispatcher>>,
    ) -> Result<Self> {
        config.validate()?;

        let db = Arc::new(DbManager::from_config(&config.database)?);
        db.run_migrations()?;

        let samples = Arc::new(SqliteActivitySampleRepository::new(Arc::clone(&db)));
        let stats = Arc::new(SqliteDailyStatsRepository::new(Arc::clone(&db)));
        let task_repo = Arc::new(SqliteTaskRepository::new(Arc::clone(&db)));

        let scores = Arc::new(ScoreService::new(samples.clone(), stats, task_repo.clone()));
        let tasks = Arc::new(TaskService::new(task_repo));
        let events = Arc::new(EventHub::new());

        let classifier = Arc::new(StateClassifier::from_config(&config.classifier)?);
        let mut engine = TrackingEngine::new(source, samples.clone(), Arc::clone(&events))
            .with_classifier(classifier)
            .with_nudge_config(config.nudge)
            .with_tracking_config(&config.tracking);
        if let Some(dispatcher) = dispatcher {
            engine = engine.with_dispatcher(dispatcher);
        }

        let tracking = Arc::new(TrackingScheduler::new(
            engine,
            Arc::clone(&scores),
            TrackingSchedulerConfig::from(&config.tracking),
        ));

        info!(db_path = %db.path().display(), "Application context initialised");
        Ok(Self { config, db, samples, scores, tasks, events, tracking })
    }

    /// Start the tracking loop unless tracking is disabled in configuration.
    /// Returns whether the loop is running afterwards.
    pub async fn start(&self) -> Result<bool> {
        if !self.config.tracking.enabled {
            info!("Tracking disabled by configuration; sampling loop not started");
            return Ok(false);
        }
        self.tracking.start().await?;
        Ok(true)
    }

    /// Stop the tracking loop, flushing the in-flight sample.
    pub async fn shutdown(&self) -> Result<()> {
        self.tracking.stop().await?;
        info!("Application context shut down");
        Ok(())
    }
}
