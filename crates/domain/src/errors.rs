//! Error types used throughout the application

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for SignalKeeper
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum SignalKeeperError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    /// The foreground window could not be resolved (permissions, OS error,
    /// timeout). Never fatal to the tracking loop.
    #[error("Platform error: {0}")]
    Platform(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Malformed or out-of-range arguments, rejected before storage is touched.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl SignalKeeperError {
    /// Stable label for logging and structured tool errors.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Database(_) => "database",
            Self::Config(_) => "config",
            Self::Platform(_) => "platform",
            Self::NotFound(_) => "not_found",
            Self::InvalidInput(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }

    /// Shorthand for a not-found error on a task id.
    pub fn task_not_found(id: &str) -> Self {
        Self::NotFound(format!("task '{id}' does not exist"))
    }
}

/// Result type alias for SignalKeeper operations
pub type Result<T> = std::result::Result<T, SignalKeeperError>;
