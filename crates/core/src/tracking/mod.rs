//! Foreground activity sampling, classification and coalescing

pub mod classifier;
pub mod clock;
pub mod engine;
pub mod monitor;
pub mod ports;

pub use classifier::StateClassifier;
pub use clock::{Continuity, Tick, TickClock};
pub use engine::{TickOutcome, TrackingEngine};
pub use monitor::ActivityMonitor;
