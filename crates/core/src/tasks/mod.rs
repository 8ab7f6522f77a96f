//! Task lifecycle and queue selection

pub mod ports;
pub mod queue;
pub mod service;

pub use queue::{backlog, signal_queue, validate_limit};
pub use service::TaskService;
