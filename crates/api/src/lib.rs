//! # SignalKeeper API
//!
//! Application layer - context wiring, commands and tool dispatch.
//!
//! This crate contains:
//! - Commands (typed entry points with execution logging)
//! - Tool-call dispatch over JSON arguments
//! - Application context (dependency injection)
//! - The `signalkeeper` daemon binary
//!
//! ## Architecture
//! - Depends on `domain`, `core`, and `infra`
//! - Wires up the hexagonal architecture

pub mod commands;
pub mod context;
pub mod tools;
pub mod utils;

// Re-export for convenience
pub use context::AppContext;
pub use tools::{dispatch, list_tools, ToolError, ToolErrorKind, ToolSpec};
