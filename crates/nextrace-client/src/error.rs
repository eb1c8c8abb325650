//! Client error types.

use nextrace_service::ServiceError;
use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Service error (unknown category, adapter setup).
    #[error("{0}")]
    Service(#[from] ServiceError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output serialization failed.
    #[error("serialization error: {0}")]
    Serialize(String),
}

impl ClientError {
    /// Returns true if the error is a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Service(e) if e.is_not_found())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}

impl From<toml::ser::Error> for ClientError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialize(err.to_string())
    }
}
