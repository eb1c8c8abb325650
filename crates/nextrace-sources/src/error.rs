//! Error types for source adapters.
//!
//! Every failure an adapter can hit is recoverable at the category level: the
//! category simply contributes no record this cycle. The codes exist so the
//! aggregator can log them meaningfully.

use std::fmt;
use thiserror::Error;

/// The category of a source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorCode {
    /// Network failure or non-2xx response.
    SourceUnavailable,
    /// The page came back but the expected structure was absent.
    ExtractionMiss,
    /// Fields were present but could not be resolved to an instant.
    DateResolution,
    /// A request or a browser wait ran past its bound.
    Timeout,
    /// The WebDriver session failed.
    Browser,
    /// Invalid adapter configuration (bad selector, bad URL).
    Configuration,
}

impl SourceErrorCode {
    /// Returns true if the aggregator treats this as "no data this cycle".
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration)
    }

    /// Returns a stable name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SourceUnavailable => "source_unavailable",
            Self::ExtractionMiss => "extraction_miss",
            Self::DateResolution => "date_resolution",
            Self::Timeout => "timeout",
            Self::Browser => "browser",
            Self::Configuration => "configuration",
        }
    }
}

impl fmt::Display for SourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while reading a source.
#[derive(Debug, Error)]
pub struct SourceError {
    code: SourceErrorCode,
    message: String,
    /// The adapter that generated this error (e.g., "dom", "browser").
    adapter: Option<String>,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Creates a new source error with the given code and message.
    pub fn new(code: SourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            adapter: None,
            source: None,
        }
    }

    /// Creates a source-unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::SourceUnavailable, message)
    }

    /// Creates an extraction-miss error.
    pub fn extraction_miss(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::ExtractionMiss, message)
    }

    /// Creates a date-resolution error.
    pub fn date_resolution(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::DateResolution, message)
    }

    /// Creates a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::Timeout, message)
    }

    /// Creates a browser error.
    pub fn browser(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::Browser, message)
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::Configuration, message)
    }

    /// Sets the adapter name for this error.
    pub fn with_adapter(mut self, adapter: impl Into<String>) -> Self {
        self.adapter = Some(adapter.into());
        self
    }

    /// Sets the source error for this error.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> SourceErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the adapter name, if set.
    pub fn adapter(&self) -> Option<&str> {
        self.adapter.as_deref()
    }

    /// Returns true if the aggregator treats this as "no data this cycle".
    pub fn is_recoverable(&self) -> bool {
        self.code.is_recoverable()
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref adapter) = self.adapter {
            write!(f, "[{}] ", adapter)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;
