//! Platform-specific implementations
//!
//! This module provides the foreground-window sources for activity tracking.
//!
//! # Platform Support
//!
//! - **macOS**: `osascript` / System Events
//! - **Linux**: `xdotool` (X11 sessions)
//! - **Other platforms**: every lookup returns a platform error

pub mod command;
pub mod static_source;

pub use command::{run_with_timeout, CommandActivitySource};
pub use static_source::StaticActivitySource;
