//! Error types for the CLI

use thiserror::Error;

/// CLI-specific errors
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Client error: {0}")]
    Client(#[from] composio_client::ClientError),

    #[error("{0}")]
    Core(#[from] composio_core::CoreError),

    #[error("Tool error: {0}")]
    Tool(#[from] composio_tools::ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Action not found: {0}")]
    ActionNotFound(String),

    #[error("Execution failed: {0}")]
    ExecutionFailed(String),

    #[error("General error: {0}")]
    General(String),
}

impl From<anyhow::Error> for CliError {
    fn from(err: anyhow::Error) -> Self {
        Self::General(format!("{:#}", err))
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
