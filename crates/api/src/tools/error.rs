//! Structured tool errors

use serde::Serialize;
use serde_json::{json, Value};
use signalkeeper_domain::SignalKeeperError;
use thiserror::Error;

/// Coarse error class exposed to tool callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    Validation,
    NotFound,
    Runtime,
}

/// Error returned by [`dispatch`](super::dispatch).
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{kind:?}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
}

impl ToolError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self { kind: ToolErrorKind::Validation, message: message.into() }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self { kind: ToolErrorKind::NotFound, message: message.into() }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self { kind: ToolErrorKind::Runtime, message: message.into() }
    }

    /// `{"error": {"kind": ..., "message": ...}}`
    pub fn to_response(&self) -> Value {
        json!({ "error": self })
    }
}

impl From<SignalKeeperError> for ToolError {
    fn from(err: SignalKeeperError) -> Self {
        match err {
            SignalKeeperError::InvalidInput(message) => Self::validation(message),
            SignalKeeperError::NotFound(message) => Self::not_found(message),
            other => Self::runtime(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for ToolError {
    fn from(err: serde_json::Error) -> Self {
        Self::validation(format!("invalid arguments: {err}"))
    }
}
