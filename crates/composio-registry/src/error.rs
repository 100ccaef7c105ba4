//! Error types for the handler registry

use composio_core::CoreError;
use thiserror::Error;

/// Failures an action handler can report
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The app rejected the call (missing permission, bad input, ...).
    /// Surfaced to callers as an unsuccessful response.
    #[error("{0}")]
    Failed(String),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl HandlerError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }

    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }
}

/// Registry-specific errors
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Action '{0}' is already registered")]
    DuplicateAction(String),

    #[error("Invalid JSON Schema for action '{action}': {reason}")]
    InvalidSchema { action: String, reason: String },
}

impl From<RegistryError> for CoreError {
    fn from(err: RegistryError) -> Self {
        CoreError::Invalid(err.to_string())
    }
}

/// Registry result type
pub type RegistryResult<T> = Result<T, RegistryError>;
