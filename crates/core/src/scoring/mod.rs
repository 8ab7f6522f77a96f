//! Signal score, streak and insight aggregation

pub mod ports;
pub mod score;
pub mod service;

pub use score::{calculate_signal_score, is_productive};
pub use service::ScoreService;
