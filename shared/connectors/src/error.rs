use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid payload: {0}")]
    InvalidPayload(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Link error: {0}")]
    Link(String),

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    #[error("Runtime error: {0}")]
    Runtime(String),
}

impl ConnectorError {
    /// Short machine-readable kind, used in HTTP error bodies and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ConnectorError::NotFound(_) => "not_found",
            ConnectorError::AlreadyExists(_) => "already_exists",
            ConnectorError::Validation(_) => "validation",
            ConnectorError::Configuration(_) => "configuration",
            ConnectorError::InvalidPayload(_) => "invalid_payload",
            ConnectorError::Serialization(_) => "serialization",
            ConnectorError::Link(_) => "link",
            ConnectorError::Stream(_) => "stream",
            ConnectorError::Timeout(_) => "timeout",
            ConnectorError::Runtime(_) => "runtime",
        }
    }
}

impl From<anyhow::Error> for ConnectorError {
    fn from(err: anyhow::Error) -> Self {
        ConnectorError::Runtime(err.to_string())
    }
}

pub type ConnectorResult<T> = Result<T, ConnectorError>;
