use composio_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),

    #[error("Invalid tool arguments for '{tool}': {reason}")]
    InvalidArguments { tool: String, reason: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

pub type ToolResult<T> = Result<T, ToolError>;
