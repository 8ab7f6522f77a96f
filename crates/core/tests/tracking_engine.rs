//! Tracking engine behaviour driven by scripted sources and explicit ticks.

mod support;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use signalkeeper_core::{EventHub, Tick, TrackingEngine};
use signalkeeper_domain::{
    DriftPhase, ForegroundWindow, NudgeConfig, ProductivityState, SignalKeeperError,
    TrackingConfig,
};
use support::repositories::InMemorySampleRepository;
use support::sources::{HangingSource, RecordingDispatcher, ScriptedSource};

const STEP: Duration = Duration::from_secs(5);

fn nudge_config() -> NudgeConfig {
    NudgeConfig {
        first_nudge_threshold_ms: 300_000,
        nudge_cooldown_ms: 600_000,
        ..NudgeConfig::default()
    }
}

fn youtube() -> ScriptedSource {
    ScriptedSource::constant("YouTube", "Cats - YouTube")
}

struct Harness {
    engine: TrackingEngine,
    source: Arc<ScriptedSource>,
    samples: Arc<InMemorySampleRepository>,
    dispatcher: Arc<RecordingDispatcher>,
    hub: Arc<EventHub>,
}

fn harness(source: ScriptedSource, dispatcher: RecordingDispatcher) -> Harness {
    let source = Arc::new(source);
    let samples = Arc::new(InMemorySampleRepository::new());
    let dispatcher = Arc::new(dispatcher);
    let hub = Arc::new(EventHub::new());
    let engine = TrackingEngine::new(source.clone(), samples.clone(), hub.clone())
        .with_dispatcher(dispatcher.clone())
        .with_nudge_config(nudge_config());
    Harness { engine, source, samples, dispatcher, hub }
}

/// Tick every 5 s over `[from, to]` seconds after `t0`; returns nudge offsets.
async fn run(engine: &mut TrackingEngine, t0: Tick, from: u64, to: u64) -> Vec<u64> {
    let mut fired = Vec::new();
    let mut offset = from;
    while offset <= to {
        let outcome = engine.tick(t0.advanced(Duration::from_secs(offset))).await;
        if outcome.nudge.is_some() {
            fired.push(offset);
        }
        offset += STEP.as_secs();
    }
    fired
}

#[tokio::test]
async fn continuous_distraction_nudges_at_threshold_and_after_cooldown() {
    let mut h = harness(youtube(), RecordingDispatcher::default());
    let heard = Arc::new(AtomicUsize::new(0));
    let counter = heard.clone();
    h.hub.on_nudge_triggered(move |event| {
        assert_eq!(event.current_app, "YouTube");
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let t0 = Tick::now();
    let fired = run(&mut h.engine, t0, 0, 900).await;

    assert_eq!(fired, vec![300, 900]);
    assert_eq!(heard.load(Ordering::SeqCst), 2);
    assert_eq!(h.dispatcher.count(), 2);

    // One coalesced sample, only written on flush.
    assert!(h.samples.all().is_empty());
    assert_eq!(h.engine.flush(t0.advanced(Duration::from_secs(900))).await, 1);
    let samples = h.samples.all();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].duration_seconds, 900);
    assert_eq!(samples[0].state, ProductivityState::Red);
    assert_eq!(samples[0].timestamp, t0.wall);
}

#[tokio::test]
async fn switching_apps_writes_samples_and_emits_state_changes() {
    let mut h = harness(ScriptedSource::constant("Code", "main.rs"), RecordingDispatcher::default());
    let changes = Arc::new(parking_lot::Mutex::new(Vec::new()));
    let sink = changes.clone();
    h.hub.on_activity_state_changed(move |event| sink.lock().push(event.state));

    let t0 = Tick::now();
    run(&mut h.engine, t0, 0, 60).await;
    h.source.switch_to("Slack", "general");
    run(&mut h.engine, t0, 65, 90).await;

    let samples = h.samples.all();
    assert_eq!(samples.len(), 1);
    assert_eq!(samples[0].app_name, "Code");
    assert_eq!(samples[0].duration_seconds, 65);
    assert_eq!(*changes.lock(), vec![ProductivityState::Green, ProductivityState::Amber]);

    let status = h.engine.status(true);
    assert_eq!(status.current_app_name.as_deref(), Some("Slack"));
    assert_eq!(status.current_state, Some(ProductivityState::Amber));
}

#[tokio::test]
async fn source_errors_skip_ticks_without_crashing() {
    let mut h = harness(
        ScriptedSource::new(vec![
            Ok(ForegroundWindow::new("Code", "main.rs")),
            Ok(ForegroundWindow::new("Code", "main.rs")),
            Err(SignalKeeperError::Platform("accessibility permission denied".into())),
        ]),
        RecordingDispatcher::default(),
    );

    let t0 = Tick::now();
    let first = h.engine.tick(t0).await;
    assert_eq!(first.state, Some(ProductivityState::Green));
    h.engine.tick(t0.advanced(STEP)).await;

    // The failing tick closes the open sample at the last good read.
    let failed = h.engine.tick(t0.advanced(STEP * 2)).await;
    assert!(failed.source_failed);
    assert_eq!(failed.state, None);
    assert_eq!(failed.samples_written, 1);
    assert_eq!(h.samples.all()[0].duration_seconds, 5);

    // Repeated failures are tolerated.
    for step in 3..10 {
        assert!(h.engine.tick(t0.advanced(STEP * step)).await.source_failed);
    }

    h.source.switch_to("Code", "main.rs");
    let recovered = h.engine.tick(t0.advanced(STEP * 10)).await;
    assert_eq!(recovered.state, Some(ProductivityState::Green));
}

#[tokio::test]
async fn unreadable_source_ends_the_drift_episode() {
    let mut h = harness(youtube(), RecordingDispatcher::default());
    let t0 = Tick::now();
    run(&mut h.engine, t0, 0, 60).await;
    assert!(h.engine.drift_status().is_drifting);

    h.source.fail_with("window server unavailable");
    let fired = run(&mut h.engine, t0, 65, 300).await;
    assert!(fired.is_empty());
    assert!(!h.engine.drift_status().is_drifting);

    // Drift is measured again from the first good read.
    h.source.switch_to("YouTube", "Cats - YouTube");
    let fired = run(&mut h.engine, t0, 305, 600).await;
    assert!(fired.is_empty(), "only observed drift counts toward the threshold");
    let fired = run(&mut h.engine, t0, 605, 605).await;
    assert_eq!(fired, vec![605]);
}

#[tokio::test]
async fn split_sample_keeps_the_drift_episode() {
    let mut h = harness(youtube(), RecordingDispatcher::default());
    let t0 = Tick::now();
    run(&mut h.engine, t0, 0, 200).await;

    assert_eq!(h.engine.split_sample(t0.advanced(Duration::from_secs(200))).await, 1);
    assert_eq!(h.samples.all()[0].duration_seconds, 200);
    assert_eq!(h.engine.drift_status().drift_duration_ms, 200_000);

    // The threshold still counts from t0, and the next sample opens fresh.
    let fired = run(&mut h.engine, t0, 205, 300).await;
    assert_eq!(fired, vec![300]);
    assert_eq!(h.engine.split_sample(t0.advanced(Duration::from_secs(300))).await, 1);
    assert_eq!(h.samples.all()[1].duration_seconds, 95);
}

#[tokio::test]
async fn nudge_config_update_sees_current_value() {
    let mut h = harness(youtube(), RecordingDispatcher::default());

    let applied = h
        .engine
        .update_nudge_config(|current| NudgeConfig { nudge_cooldown_ms: 0, ..current })
        .unwrap();
    assert_eq!(applied.first_nudge_threshold_ms, 300_000);
    assert_eq!(h.engine.nudge_config().nudge_cooldown_ms, 0);

    let rejected = h
        .engine
        .update_nudge_config(|current| NudgeConfig { first_nudge_threshold_ms: 0, ..current });
    assert!(matches!(rejected, Err(SignalKeeperError::InvalidInput(_))));
    assert_eq!(h.engine.nudge_config(), applied);
}

#[tokio::test(start_paused = true)]
async fn slow_source_times_out() {
    let samples = Arc::new(InMemorySampleRepository::new());
    let mut engine = TrackingEngine::new(
        Arc::new(HangingSource { delay: Duration::from_secs(30) }),
        samples,
        Arc::new(EventHub::new()),
    )
    .with_tracking_config(&TrackingConfig { source_timeout_ms: 2_000, ..TrackingConfig::default() });

    let outcome = engine.tick(Tick::now()).await;
    assert!(outcome.source_failed);
    assert!(outcome.state.is_none());
}

#[tokio::test]
async fn pause_finalizes_sample_and_stops_drift() {
    let mut h = harness(youtube(), RecordingDispatcher::default());
    let t0 = Tick::now();

    run(&mut h.engine, t0, 0, 200).await;
    assert!(h.engine.drift_status().is_drifting);

    assert!(h.engine.toggle_pause(t0.advanced(Duration::from_secs(202))).await);
    assert_eq!(h.samples.all().len(), 1);
    assert_eq!(h.samples.all()[0].duration_seconds, 202);
    assert!(!h.engine.drift_status().is_drifting);
    assert!(h.engine.status(true).is_paused);

    // Ten paused minutes: nothing recorded, no nudge.
    let fired = run(&mut h.engine, t0, 205, 805).await;
    assert!(fired.is_empty());
    assert_eq!(h.samples.all().len(), 1);

    assert!(!h.engine.toggle_pause(t0.advanced(Duration::from_secs(806))).await);
    // Drift restarts from zero after resuming.
    let fired = run(&mut h.engine, t0, 810, 1105).await;
    assert!(fired.is_empty());
    let fired = run(&mut h.engine, t0, 1110, 1110).await;
    assert_eq!(fired, vec![1110]);
}

#[tokio::test]
async fn clock_jump_cuts_sample_and_resets_episode() {
    let mut h = harness(youtube(), RecordingDispatcher::default());
    let t0 = Tick::now();
    run(&mut h.engine, t0, 0, 250).await;

    // Laptop lid closed for an hour.
    let resumed = h.engine.tick(t0.advanced(Duration::from_secs(3_850))).await;
    assert!(resumed.discontinuity);
    assert!(resumed.nudge.is_none());
    assert_eq!(resumed.samples_written, 1);
    assert_eq!(h.samples.all()[0].duration_seconds, 250);
    assert_eq!(h.engine.drift_status().drift_duration_ms, 0);
}

#[tokio::test]
async fn dispatch_failure_does_not_corrupt_detector() {
    let mut h = harness(ScriptedSource::constant("Reddit", "r/rust"), RecordingDispatcher::failing());
    let t0 = Tick::now();
    let fired = run(&mut h.engine, t0, 0, 300).await;
    assert_eq!(fired, vec![300]);
    assert_eq!(h.dispatcher.count(), 1);
    assert_eq!(h.engine.drift_status().phase, DriftPhase::Nudged);

    let fired = run(&mut h.engine, t0, 305, 900).await;
    assert_eq!(fired, vec![900]);
}

#[tokio::test]
async fn silent_delivery_skips_dispatcher_but_not_listeners() {
    let mut h = harness(youtube(), RecordingDispatcher::default());
    h.engine
        .set_nudge_config(NudgeConfig {
            show_system_notifications: false,
            ai_nudges_enabled: false,
            ..nudge_config()
        })
        .unwrap();
    let heard = Arc::new(AtomicUsize::new(0));
    let counter = heard.clone();
    h.hub.on_nudge_triggered(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    let fired = run(&mut h.engine, Tick::now(), 0, 300).await;
    assert_eq!(fired, vec![300]);
    assert_eq!(heard.load(Ordering::SeqCst), 1);
    assert_eq!(h.dispatcher.count(), 0);
}

#[tokio::test]
async fn snoozed_app_is_not_nudged_until_expiry() {
    let mut h = harness(ScriptedSource::constant("Slack", "random"), RecordingDispatcher::default());
    let t0 = Tick::now();
    h.engine.snooze_app("Slack", 10, t0.wall).unwrap();

    let fired = run(&mut h.engine, t0, 0, 595).await;
    assert!(fired.is_empty());
    assert_eq!(h.engine.drift_status().phase, DriftPhase::Snoozed);
    assert_eq!(h.engine.active_snoozes(t0.wall).len(), 1);

    let fired = run(&mut h.engine, t0, 600, 600).await;
    assert_eq!(fired, vec![600]);
}

#[tokio::test]
async fn storage_failures_are_logged_and_tracking_continues() {
    let mut h = harness(ScriptedSource::constant("Code", "main.rs"), RecordingDispatcher::default());
    h.samples.fail_writes(true);
    let t0 = Tick::now();
    run(&mut h.engine, t0, 0, 10).await;
    h.source.switch_to("Slack", "general");

    let outcome = h.engine.tick(t0.advanced(Duration::from_secs(15))).await;
    assert_eq!(outcome.samples_written, 0);
    assert_eq!(outcome.state, Some(ProductivityState::Amber));
}
