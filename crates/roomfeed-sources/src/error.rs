//! Error types for source client operations.
//!
//! Every failure a source client can report falls into one of three
//! categories. The aggregator treats them identically for control flow but
//! keeps the category and the source key for diagnostics.

use std::fmt;
use thiserror::Error;

use crate::raw_event::MandatoryField;

/// The category of a source error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceErrorCode {
    /// Network or transport failure, including timeouts, throttling and
    /// server-side errors.
    Unavailable,
    /// Credentials or access token were rejected.
    AuthFailure,
    /// The provider rejected the query (malformed window, unknown resource).
    QueryRejected,
}

impl SourceErrorCode {
    /// Returns a stable, log-friendly name for this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unavailable => "source_unavailable",
            Self::AuthFailure => "source_auth_failure",
            Self::QueryRejected => "source_query_rejected",
        }
    }
}

impl fmt::Display for SourceErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error that occurred while fetching events from a calendar resource.
#[derive(Debug, Error)]
pub struct SourceError {
    code: SourceErrorCode,
    message: String,
    /// The calendar resource the failing request was addressed to.
    source_key: Option<String>,
    #[source]
    cause: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl SourceError {
    /// Creates a new source error with the given code and message.
    pub fn new(code: SourceErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source_key: None,
            cause: None,
        }
    }

    /// Creates a transport-level error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::Unavailable, message)
    }

    /// Creates a credential error.
    pub fn auth_failure(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::AuthFailure, message)
    }

    /// Creates a rejected-query error.
    pub fn query_rejected(message: impl Into<String>) -> Self {
        Self::new(SourceErrorCode::QueryRejected, message)
    }

    /// Sets the source key for this error.
    pub fn with_source_key(mut self, source_key: impl Into<String>) -> Self {
        self.source_key = Some(source_key.into());
        self
    }

    /// Sets the underlying cause of this error.
    pub fn with_cause<E>(mut self, cause: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.cause = Some(Box::new(cause));
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

    /// Returns the source key, if set.
    pub fn source_key(&self) -> Option<&str> {
        self.source_key.as_deref()
    }
}

impl fmt::Display for SourceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ref key) = self.source_key {
            write!(f, "[{}] ", key)?;
        }
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for source operations.
pub type SourceResult<T> = Result<T, SourceError>;

/// A fetched event is missing a mandatory field.
///
/// This is an upstream defect. It is reported rather than dropped, because a
/// silently missing booking would make a room look free.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("event {} has no {field} time", .event_id.as_deref().unwrap_or("<no id>"))]
pub struct MalformedEvent {
    /// Provider id of the offending event, if it had one.
    pub event_id: Option<String>,
    /// The missing field.
    pub field: MandatoryField,
}
