//! Drift detection and nudge decisions

pub mod detector;
pub mod ports;

pub use detector::DriftDetector;
