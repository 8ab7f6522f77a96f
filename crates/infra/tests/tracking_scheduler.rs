//! Tracking scheduler lifecycle under paused tokio time.

mod support;

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use signalkeeper_core::ActivitySampleRepository;
use signalkeeper_domain::{ActivitySample, NudgeConfig, NudgeEvent, ProductivityState, SignalKeeperError};
use signalkeeper_infra::{StaticActivitySource, TrackingScheduler, TrackingSchedulerConfig};

use support::TestDatabase;

fn scheduler_config() -> TrackingSchedulerConfig {
    TrackingSchedulerConfig { sample_interval: Duration::from_secs(1), ..Default::default() }
}

fn fast_nudges() -> NudgeConfig {
    NudgeConfig {
        first_nudge_threshold_ms: 3_000,
        nudge_cooldown_ms: 60_000,
        ..NudgeConfig::default()
    }
}

async fn stored_samples(db: &TestDatabase) -> Vec<ActivitySample> {
    let now = Utc::now();
    db.samples()
        .samples_between(now - chrono::Duration::days(1), now + chrono::Duration::days(1))
        .await
        .expect("samples readable")
}

#[tokio::test(start_paused = true)]
async fn start_and_stop_are_idempotent_and_stop_flushes() {
    let db = TestDatabase::new();
    let source = StaticActivitySource::new("Code", "main.rs - signalkeeper");
    let (engine, _hub) = db.engine(source, NudgeConfig::default());
    let scheduler = TrackingScheduler::new(engine, db.score_service(), scheduler_config());

    assert!(!scheduler.is_running().await);
    assert!(scheduler.start().await.unwrap());
    assert!(!scheduler.start().await.unwrap());

    tokio::time::sleep(Duration::from_millis(5_500)).await;

    let status = scheduler.status().await.unwrap();
    assert!(status.is_running);
    assert!(!status.is_paused);
    assert_eq!(status.current_app_name.as_deref(), Some("Code"));
    assert_eq!(status.current_state, Some(ProductivityState::Green));
    assert!(stored_samples(&db).await.is_empty(), "nothing finalized while the window is unchanged");

    assert!(scheduler.stop().await.unwrap());
    assert!(!scheduler.stop().await.unwrap());
    assert!(!scheduler.status().await.unwrap().is_running);

    let samples = stored_samples(&db).await;
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].app_name, "Code");
    assert!(samples[0].duration_seconds >= 5);

    // The parked engine can be started again.
    assert!(scheduler.start().await.unwrap());
    assert!(scheduler.stop().await.unwrap());
}

#[tokio::test(start_paused = true)]
async fn window_change_and_pause_finalize_samples() {
    let db = TestDatabase::new();
    let source = StaticActivitySource::new("Code", "lib.rs");
    let (engine, _hub) = db.engine(source.clone(), NudgeConfig::default());
    let scheduler = TrackingScheduler::new(engine, db.score_service(), scheduler_config());
    scheduler.start().await.unwrap();

    tokio::time::sleep(Duration::from_millis(3_500)).await;
    source.set_window("Slack", "general");
    tokio::time::sleep(Duration::from_secs(2)).await;

    let samples = stored_samples(&db).await;
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].app_name, "Code");

    assert!(scheduler.toggle_pause().await.unwrap());
    assert_eq!(stored_samples(&db).await.len(), 2);
    tokio::time::sleep(Duration::from_secs(3)).await;
    assert!(scheduler.status().await.unwrap().is_paused);
    assert_eq!(stored_samples(&db).await.len(), 2, "paused loop writes nothing");

    assert!(!scheduler.toggle_pause().await.unwrap());
    scheduler.stop().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn sustained_drift_fires_one_nudge() {
    let db = TestDatabase::new();
    let source = StaticActivitySource::new("YouTube", "Cats - YouTube");
    let (engine, hub) = db.engine(source, fast_nudges());

    let received: Arc<Mutex<Vec<NudgeEvent>>> = Arc::default();
    let sink = Arc::clone(&received);
    hub.on_nudge_triggered(move |event| sink.lock().unwrap().push(event.clone()));

    let scheduler = TrackingScheduler::new(engine, db.score_service(), scheduler_config());
    scheduler.start().await.unwrap();
    tokio::time::sleep(Duration::from_millis(10_500)).await;

    let drift = scheduler.drift_status().await.unwrap();
    assert!(drift.is_drifting);
    assert_eq!(drift.current_app.as_deref(), Some("YouTube"));
    scheduler.stop().await.unwrap();

    let nudges = received.lock().unwrap();
    assert_eq!(nudges.len(), 1);
    assert_eq!(nudges[0].current_app, "YouTube");
    assert!(nudges[0].drift_duration_ms >= 3_000);
}

#[tokio::test(start_paused = true)]
async fn snoozed_app_stays_quiet() {
    let db = TestDatabase::new();
    let source = StaticActivitySource::new("YouTube", "Cats - YouTube");
    let (engine, hub) = db.engine(source, fast_nudges());

    let received: Arc<Mutex<Vec<NudgeEvent>>> = Arc::default();
    let sink = Arc::clone(&received);
    hub.on_nudge_triggered(move |event| sink.lock().unwrap().push(event.clone()));

    let scheduler = TrackingScheduler::new(engine, db.score_service(), scheduler_config());
    scheduler.start().await.unwrap();
    let entry = scheduler.snooze_app("YouTube", 10).await.unwrap().unwrap();
    assert_eq!(entry.app_name, "YouTube");

    tokio::time::sleep(Duration::from_secs(10)).await;
    assert_eq!(scheduler.active_snoozes().await.unwrap().len(), 1);
    scheduler.stop().await.unwrap();

    assert!(received.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn stopped_scheduler_answers_config_commands() {
    let db = TestDatabase::new();
    let (engine, _hub) = db.engine(StaticActivitySource::new("Code", ""), NudgeConfig::default());
    let scheduler = TrackingScheduler::new(engine, db.score_service(), scheduler_config());

    assert_eq!(scheduler.nudge_config().await.unwrap(), NudgeConfig::default());

    let rejected = NudgeConfig { first_nudge_threshold_ms: 0, ..NudgeConfig::default() };
    assert!(matches!(
        scheduler.set_nudge_config(rejected).await.unwrap(),
        Err(SignalKeeperError::InvalidInput(_))
    ));

    scheduler.set_nudge_config(fast_nudges()).await.unwrap().unwrap();
    scheduler.start().await.unwrap();
    assert_eq!(scheduler.nudge_config().await.unwrap(), fast_nudges());
    scheduler.stop().await.unwrap();

    assert!(matches!(
        scheduler.snooze_app("  ", 5).await.unwrap(),
        Err(SignalKeeperError::InvalidInput(_))
    ));
}

#[tokio::test(start_paused = true)]
async fn running_scheduler_applies_config_updates_in_place() {
    let db = TestDatabase::new();
    let (engine, _hub) = db.engine(StaticActivitySource::new("Code", ""), NudgeConfig::default());
    let scheduler = TrackingScheduler::new(engine, db.score_service(), scheduler_config());
    scheduler.start().await.unwrap();

    let (a, b) = tokio::join!(
        scheduler.update_nudge_config(|c| NudgeConfig { nudge_cooldown_ms: 0, ..c }),
        scheduler.update_nudge_config(|c| NudgeConfig { ai_nudges_enabled: false, ..c }),
    );
    a.unwrap().unwrap();
    b.unwrap().unwrap();

    let config = scheduler.nudge_config().await.unwrap();
    assert_eq!(config.nudge_cooldown_ms, 0);
    assert!(!config.ai_nudges_enabled);
    assert_eq!(config.first_nudge_threshold_ms, NudgeConfig::default().first_nudge_threshold_ms);

    let rejected = scheduler
        .update_nudge_config(|c| NudgeConfig { first_nudge_threshold_ms: 0, ..c })
        .await
        .unwrap();
    assert!(matches!(rejected, Err(SignalKeeperError::InvalidInput(_))));
    assert_eq!(scheduler.nudge_config().await.unwrap(), config);
    scheduler.stop().await.unwrap();
}
