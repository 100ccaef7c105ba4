use thiserror::Error;

pub type CoreResult<T> = Result<T, CoreError>;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid: {0}")]
    Invalid(String),
    #[error("unknown action: {0}")]
    UnknownAction(String),
    #[error("no active connection found for entity '{entity_id}' and app '{app}'")]
    NoActiveConnection { entity_id: String, app: String },
    #[error("connected account not found: {0}")]
    ConnectedAccountNotFound(String),
    #[error("connected account '{id}' is not active (status: {status})")]
    InactiveConnection { id: String, status: String },
    #[error("connected account '{id}' belongs to app '{actual}', action requires '{expected}'")]
    AppMismatch {
        id: String,
        expected: String,
        actual: String,
    },
    #[error("unauthorized: {0}")]
    Unauthorized(String),
    #[error("transport: {0}")]
    Transport(String),
    #[error("timeout: {0}")]
    Timeout(String),
    #[error("serde: {0}")]
    Serde(String),
    #[error("other: {0}")]
    Other(String),
}

impl CoreError {
    /// Errors the resolution rule reports to the caller as a failed execution
    /// rather than raising.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            CoreError::NoActiveConnection { .. }
                | CoreError::ConnectedAccountNotFound(_)
                | CoreError::InactiveConnection { .. }
                | CoreError::AppMismatch { .. }
        )
    }
}

impl From<serde_json::Error> for CoreError {
    fn from(err: serde_json::Error) -> Self {
        CoreError::Serde(err.to_string())
    }
}
