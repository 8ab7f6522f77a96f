//! Tracking scheduler - the live sampling loop.
//!
//! A single tokio task (the actor) owns the [`TrackingEngine`] while the
//! scheduler runs and is driven by one `tokio::time::interval`. Callers talk
//! to it over an `mpsc` channel with `oneshot` replies. While stopped, the
//! engine is parked inside the scheduler and commands are answered directly.
//!
//! On start the previous local day is closed out if it has no stored row.
//! When the local date rolls over, the in-flight sample is split at the
//! boundary tick (the drift episode carries on) and the finished day is
//! closed out.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use signalkeeper_core::{ScoreService, TrackingEngine};
//! use signalkeeper_infra::scheduling::{TrackingScheduler, TrackingSchedulerConfig};
//!
//! # async fn example(engine: TrackingEngine, scores: Arc<ScoreService>) -> signalkeeper_infra::scheduling::SchedulerResult<()> {
//! let scheduler = TrackingScheduler::new(engine, scores, TrackingSchedulerConfig::default());
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use signalkeeper_core::{ScoreService, Tick, TrackingEngine};
use signalkeeper_domain::constants::DEFAULT_SAMPLE_INTERVAL_MS;
use signalkeeper_domain::utils::dates::local_date_of;
use signalkeeper_domain::{
    DriftStatus, MonitorStatus, NudgeConfig, Result as DomainResult, SnoozeEntry, TrackingConfig,
};
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, instrument, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the tracking scheduler.
#[derive(Debug, Clone)]
pub struct TrackingSchedulerConfig {
    /// Time between two sampling ticks.
    pub sample_interval: Duration,
    /// How long `stop()` waits for the actor to flush and exit.
    pub join_timeout: Duration,
    /// Capacity of the command channel.
    pub command_buffer: usize,
    /// Maps a wall-clock instant to the day it is accounted to.
    pub local_day: fn(DateTime<Utc>) -> NaiveDate,
}

impl Default for TrackingSchedulerConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(DEFAULT_SAMPLE_INTERVAL_MS),
            join_timeout: Duration::from_secs(5),
            command_buffer: 32,
            local_day: local_date_of,
        }
    }
}

impl From<&TrackingConfig> for TrackingSchedulerConfig {
    fn from(config: &TrackingConfig) -> Self {
        Self {
            sample_interval: Duration::from_millis(config.sample_interval_ms),
            ..Self::default()
        }
    }
}

enum Command {
    Status(oneshot::Sender<MonitorStatus>),
    TogglePause(oneshot::Sender<bool>),
    GetNudgeConfig(oneshot::Sender<NudgeConfig>),
    UpdateNudgeConfig(NudgeConfigUpdate, oneshot::Sender<DomainResult<NudgeConfig>>),
    DriftStatus(oneshot::Sender<DriftStatus>),
    Snooze { app_name: String, minutes: u32, reply: oneshot::Sender<DomainResult<SnoozeEntry>> },
    ActiveSnoozes(oneshot::Sender<Vec<SnoozeEntry>>),
}

type NudgeConfigUpdate = Box<dyn FnOnce(NudgeConfig) -> NudgeConfig + Send>;

struct RunningActor {
    commands: mpsc::Sender<Command>,
    cancellation: CancellationToken,
    handle: JoinHandle<TrackingEngine>,
}

enum Lifecycle {
    Idle(TrackingEngine),
    Running(RunningActor),
    Lost(String),
}

/// Owns the tracking engine and its sampling loop.
pub struct TrackingScheduler {
    config: TrackingSchedulerConfig,
    scores: Arc<ScoreService>,
    lifecycle: Mutex<Lifecycle>,
}

impl TrackingScheduler {
    pub fn new(
        engine: TrackingEngine,
        scores: Arc<ScoreService>,
        config: TrackingSchedulerConfig,
    ) -> Self {
        Self { config, scores, lifecycle: Mutex::new(Lifecycle::Idle(engine)) }
    }

    /// Start the sampling loop. Returns `Ok(false)` if it was already running.
    ///
    /// # Errors
    /// `SchedulerError::Unavailable` if a previous actor was lost.
    #[instrument(skip(self))]
    pub async fn start(&self) -> SchedulerResult<bool> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Idle(_) => {}
            Lifecycle::Running(_) => {
                debug!("Tracking scheduler already running");
                return Ok(false);
            }
            Lifecycle::Lost(reason) => return Err(SchedulerError::Unavailable(reason.clone())),
        }

        let today = (self.config.local_day)(Utc::now());
        match self.scores.catch_up(today).await {
            Ok(Some(stats)) => info!(date = %stats.date, "Closed out previous day on start-up"),
            Ok(None) => {}
            Err(err) => warn!(error = %err, "Start-up close-out failed"),
        }

        let engine = match std::mem::replace(&mut *lifecycle, Lifecycle::Lost(String::new())) {
            Lifecycle::Idle(engine) => engine,
            other => {
                *lifecycle = other;
                return Ok(false);
            }
        };

        let (commands, receiver) = mpsc::channel(self.config.command_buffer.max(1));
        let cancellation = CancellationToken::new();
        let handle = tokio::spawn(run_actor(
            engine,
            Arc::clone(&self.scores),
            receiver,
            cancellation.clone(),
            self.config.sample_interval,
            self.config.local_day,
            today,
        ));

        *lifecycle = Lifecycle::Running(RunningActor { commands, cancellation, handle });
        info!(interval_ms = self.config.sample_interval.as_millis() as u64, "Tracking scheduler started");
        Ok(true)
    }

    /// Stop the loop, flushing the in-flight sample. Returns `Ok(false)` if
    /// it was not running.
    ///
    /// # Errors
    /// `SchedulerError::Timeout` if the actor does not exit within the join
    /// timeout (it is then aborted), `SchedulerError::TaskJoinFailed` if it
    /// panicked. Either way the scheduler cannot be restarted.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> SchedulerResult<bool> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Running(_) => {}
            Lifecycle::Idle(_) => return Ok(false),
            Lifecycle::Lost(reason) => return Err(SchedulerError::Unavailable(reason.clone())),
        }

        let actor = match std::mem::replace(&mut *lifecycle, Lifecycle::Lost(String::new())) {
            Lifecycle::Running(actor) => actor,
            other => {
                *lifecycle = other;
                return Ok(false);
            }
        };

        actor.cancellation.cancel();
        drop(actor.commands);

        let join_timeout = self.config.join_timeout;
        let mut handle = actor.handle;
        match tokio::time::timeout(join_timeout, &mut handle).await {
            Ok(Ok(engine)) => {
                *lifecycle = Lifecycle::Idle(engine);
                info!("Tracking scheduler stopped");
                Ok(true)
            }
            Ok(Err(join_err)) => {
                error!(error = %join_err, "Tracking actor failed");
                *lifecycle = Lifecycle::Lost(join_err.to_string());
                Err(SchedulerError::TaskJoinFailed(join_err.to_string()))
            }
            Err(_) => {
                handle.abort();
                let millis = u64::try_from(join_timeout.as_millis()).unwrap_or(u64::MAX);
                warn!(timeout_ms = millis, "Tracking actor did not stop in time; aborted");
                *lifecycle = Lifecycle::Lost(format!("aborted after {millis} ms"));
                Err(SchedulerError::Timeout { millis })
            }
        }
    }

    pub async fn is_running(&self) -> bool {
        matches!(&*self.lifecycle.lock().await, Lifecycle::Running(_))
    }

    pub async fn status(&self) -> SchedulerResult<MonitorStatus> {
        self.query(Command::Status, |engine| engine.status(false)).await
    }

    /// Flip the pause flag, returning the new value.
    pub async fn toggle_pause(&self) -> SchedulerResult<bool> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &mut *lifecycle {
            Lifecycle::Idle(engine) => Ok(engine.toggle_pause(Tick::now()).await),
            Lifecycle::Running(actor) => {
                let sender = actor.commands.clone();
                drop(lifecycle);
                request(&sender, Command::TogglePause).await
            }
            Lifecycle::Lost(reason) => Err(SchedulerError::Unavailable(reason.clone())),
        }
    }

    pub async fn nudge_config(&self) -> SchedulerResult<NudgeConfig> {
        self.query(Command::GetNudgeConfig, TrackingEngine::nudge_config).await
    }

    /// The outer result is the scheduler's, the inner one the validation
    /// outcome.
    pub async fn set_nudge_config(
        &self,
        config: NudgeConfig,
    ) -> SchedulerResult<DomainResult<()>> {
        let applied = self.update_nudge_config(move |_| config).await?;
        Ok(applied.map(|_| ()))
    }

    /// Read-modify-write of the nudge config as one step on the engine, so
    /// concurrent partial updates cannot overwrite each other.
    pub async fn update_nudge_config<F>(
        &self,
        update: F,
    ) -> SchedulerResult<DomainResult<NudgeConfig>>
    where
        F: FnOnce(NudgeConfig) -> NudgeConfig + Send + 'static,
    {
        let mut lifecycle = self.lifecycle.lock().await;
        match &mut *lifecycle {
            Lifecycle::Idle(engine) => Ok(engine.update_nudge_config(update)),
            Lifecycle::Running(actor) => {
                let sender = actor.commands.clone();
                drop(lifecycle);
                request(&sender, |reply| Command::UpdateNudgeConfig(Box::new(update), reply)).await
            }
            Lifecycle::Lost(reason) => Err(SchedulerError::Unavailable(reason.clone())),
        }
    }

    pub async fn drift_status(&self) -> SchedulerResult<DriftStatus> {
        self.query(Command::DriftStatus, TrackingEngine::drift_status).await
    }

    pub async fn snooze_app(
        &self,
        app_name: &str,
        minutes: u32,
    ) -> SchedulerResult<DomainResult<SnoozeEntry>> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &mut *lifecycle {
            Lifecycle::Idle(engine) => Ok(engine.snooze_app(app_name, minutes, chrono::Utc::now())),
            Lifecycle::Running(actor) => {
                let sender = actor.commands.clone();
                drop(lifecycle);
                let app_name = app_name.to_string();
                request(&sender, |reply| Command::Snooze { app_name, minutes, reply }).await
            }
            Lifecycle::Lost(reason) => Err(SchedulerError::Unavailable(reason.clone())),
        }
    }

    pub async fn active_snoozes(&self) -> SchedulerResult<Vec<SnoozeEntry>> {
        let mut lifecycle = self.lifecycle.lock().await;
        match &mut *lifecycle {
            Lifecycle::Idle(engine) => Ok(engine.active_snoozes(chrono::Utc::now())),
            Lifecycle::Running(actor) => {
                let sender = actor.commands.clone();
                drop(lifecycle);
                request(&sender, Command::ActiveSnoozes).await
            }
            Lifecycle::Lost(reason) => Err(SchedulerError::Unavailable(reason.clone())),
        }
    }

    /// Read-only query: answered by the parked engine or the actor.
    async fn query<T, C, F>(&self, command: C, idle: F) -> SchedulerResult<T>
    where
        T: Send + 'static,
        C: FnOnce(oneshot::Sender<T>) -> Command,
        F: FnOnce(&TrackingEngine) -> T,
    {
        let lifecycle = self.lifecycle.lock().await;
        match &*lifecycle {
            Lifecycle::Idle(engine) => Ok(idle(engine)),
            Lifecycle::Running(actor) => {
                let sender = actor.commands.clone();
                drop(lifecycle);
                request(&sender, command).await
            }
            Lifecycle::Lost(reason) => Err(SchedulerError::Unavailable(reason.clone())),
        }
    }
}

async fn request<T, C>(sender: &mpsc::Sender<Command>, command: C) -> SchedulerResult<T>
where
    C: FnOnce(oneshot::Sender<T>) -> Command,
{
    let (reply, response) = oneshot::channel();
    sender.send(command(reply)).await.map_err(|_| SchedulerError::ChannelClosed)?;
    response.await.map_err(|_| SchedulerError::ChannelClosed)
}

async fn run_actor(
    mut engine: TrackingEngine,
    scores: Arc<ScoreService>,
    mut commands: mpsc::Receiver<Command>,
    cancellation: CancellationToken,
    interval: Duration,
    local_day: fn(DateTime<Utc>) -> NaiveDate,
    mut current_day: NaiveDate,
) -> TrackingEngine {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            () = cancellation.cancelled() => break,
            Some(command) = commands.recv() => handle_command(&mut engine, command).await,
            _ = ticker.tick() => {
                let tick = Tick::now();
                let outcome = engine.tick(tick).await;
                if outcome.samples_written > 0 {
                    debug!(samples = outcome.samples_written, "Samples persisted");
                }

                let day = local_day(tick.wall);
                if day != current_day {
                    let split = engine.split_sample(tick).await;
                    info!(finished = %current_day, today = %day, split, "Local date rolled over");
                    if let Err(err) = scores.close_out_day(current_day).await {
                        error!(error = %err, date = %current_day, "Close-out failed");
                    }
                    current_day = day;
                }
            }
        }
    }

    let flushed = engine.flush(Tick::now()).await;
    debug!(flushed, "Tracking actor exiting");
    engine
}

async fn handle_command(engine: &mut TrackingEngine, command: Command) {
    // A dropped reply receiver means the caller gave up; nothing to do.
    match command {
        Command::Status(reply) => {
            let _ = reply.send(engine.status(true));
        }
        Command::TogglePause(reply) => {
            let paused = engine.toggle_pause(Tick::now()).await;
            let _ = reply.send(paused);
        }
        Command::GetNudgeConfig(reply) => {
            let _ = reply.send(engine.nudge_config());
        }
        Command::UpdateNudgeConfig(update, reply) => {
            let _ = reply.send(engine.update_nudge_config(update));
        }
        Command::DriftStatus(reply) => {
            let _ = reply.send(engine.drift_status());
        }
        Command::Snooze { app_name, minutes, reply } => {
            let _ = reply.send(engine.snooze_app(&app_name, minutes, chrono::Utc::now()));
        }
        Command::ActiveSnoozes(reply) => {
            let _ = reply.send(engine.active_snoozes(chrono::Utc::now()));
        }
    }
}
