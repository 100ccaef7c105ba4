use composio_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

impl From<ClientError> for CoreError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Config(msg) => CoreError::Invalid(msg),
            ClientError::Http(e) if e.is_timeout() => CoreError::Timeout(e.to_string()),
            ClientError::Http(e) => CoreError::Transport(e.to_string()),
            ClientError::Unauthorized(msg) => CoreError::Unauthorized(msg),
            ClientError::Api { status, message } => {
                CoreError::Transport(format!("status {}: {}", status, message))
            }
            ClientError::Decode(msg) => CoreError::Serde(msg),
            ClientError::Url(e) => CoreError::Invalid(e.to_string()),
            ClientError::Core(e) => e,
            ClientError::Io(e) => CoreError::Other(e.to_string()),
            ClientError::Yaml(e) => CoreError::Serde(e.to_string()),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;
