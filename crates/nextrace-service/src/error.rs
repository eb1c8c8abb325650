//! Service error types.

use std::io;

use nextrace_sources::SourceError;
use thiserror::Error;

/// Result type for service operations.
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors that can occur in the service.
///
/// Source failures during aggregation never surface here; they degrade into
/// missing categories or placeholder data. `Source` only covers building the
/// adapters.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// A calendar export was requested for a category that is not configured
    /// or has no record in the current race set.
    #[error("Unknown category: {id}")]
    UnknownCategory { id: String },

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// IO error (reading the configuration file).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Malformed configuration file.
    #[error("Invalid configuration file: {0}")]
    Toml(#[from] toml::de::Error),

    /// Adapter construction failed.
    #[error("Source setup failed: {0}")]
    Source(#[from] SourceError),
}

impl ServiceError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an unknown category error.
    pub fn unknown_category(id: impl Into<String>) -> Self {
        Self::UnknownCategory { id: id.into() }
    }

    /// Returns true if the caller should see a not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::UnknownCategory { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_category_is_not_found() {
        let err = ServiceError::unknown_category("f1");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Unknown category: f1");
    }

    #[test]
    fn other_errors_are_not_not_found() {
        assert!(!ServiceError::config("bad").is_not_found());
        let io = ServiceError::from(io::Error::new(io::ErrorKind::NotFound, "missing"));
        assert!(!io.is_not_found());
        assert!(io.to_string().starts_with("IO error"));
    }
}
