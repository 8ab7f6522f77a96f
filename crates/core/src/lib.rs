//! # SignalKeeper Core
//!
//! Pure business logic layer - no infrastructure dependencies.
//!
//! This crate contains:
//! - Productivity classification and sample coalescing
//! - The drift/nudge state machine and listener registry
//! - Signal score, streak and insight aggregation
//! - Task lifecycle rules and queue selection
//! - Port interfaces (traits) implemented by `signalkeeper-infra`
//!
//! ## Architecture Principles
//! - Only depends on `signalkeeper-domain`
//! - No database, process or platform code
//! - All external dependencies via traits

pub mod events;
pub mod nudge;
pub mod scoring;
pub mod tasks;
pub mod tracking;

// Re-export specific items to avoid ambiguity
pub use events::{EventHub, NudgeHandler, StateChangeHandler, SubscriptionId};
pub use nudge::ports::NudgeDispatcher;
pub use nudge::DriftDetector;
pub use scoring::ports::DailyStatsRepository;
pub use scoring::{calculate_signal_score, ScoreService};
pub use tasks::ports::TaskRepository;
pub use tasks::TaskService;
pub use tracking::ports::{ActivitySampleRepository, ActivitySource};
pub use tracking::{ActivityMonitor, StateClassifier, Tick, TickClock, TickOutcome, TrackingEngine};
