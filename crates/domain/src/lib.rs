//! # SignalKeeper Domain
//!
//! Business domain types and models for SignalKeeper.
//!
//! This crate contains:
//! - Activity, nudge, statistics and task data types
//! - Domain error type and Result alias
//! - Configuration structures
//! - Domain constants and pure date/title helpers
//!
//! ## Architecture
//! - No dependencies on other SignalKeeper crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod macros;
pub mod types;
pub mod utils;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
