//! Aggregation error types.

use roomfeed_sources::{MandatoryField, SourceError, SourceErrorCode};
use thiserror::Error;

use crate::config::ConfigError;

/// Result type for aggregation.
pub type AggregateResult<T> = Result<T, AggregateError>;

/// Why an aggregation produced no feed.
#[derive(Debug, Error)]
pub enum AggregateError {
    /// The configuration was rejected before any fetch.
    #[error("configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// A source fetch failed.
    #[error("source {source_key} failed: {}: {}", .error.code(), .error.message())]
    Source {
        source_key: String,
        #[source]
        error: SourceError,
    },

    /// A source returned an event without a start or end time.
    #[error("malformed event from {source_key}: event {} has no {field} time", .event_id.as_deref().unwrap_or("<no id>"))]
    MalformedEvent {
        source_key: String,
        event_id: Option<String>,
        field: MandatoryField,
    },
}

/// Broad category of an [`AggregateError`], for mapping to responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Configuration,
    SourceUnavailable,
    SourceAuthFailure,
    SourceQueryRejected,
    MalformedEvent,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Configuration => "configuration_error",
            Self::SourceUnavailable => "source_unavailable",
            Self::SourceAuthFailure => "source_auth_failure",
            Self::SourceQueryRejected => "source_query_rejected",
            Self::MalformedEvent => "malformed_event",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AggregateError {
    /// Creates a source error, tagging it with `source_key`.
    pub fn from_source(source_key: impl Into<String>, error: SourceError) -> Self {
        Self::Source {
            source_key: source_key.into(),
            error,
        }
    }

    /// Returns the category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::Source { error, .. } => match error.code() {
                SourceErrorCode::Unavailable => ErrorKind::SourceUnavailable,
                SourceErrorCode::AuthFailure => ErrorKind::SourceAuthFailure,
                SourceErrorCode::QueryRejected => ErrorKind::SourceQueryRejected,
            },
            Self::MalformedEvent { .. } => ErrorKind::MalformedEvent,
        }
    }

    /// Returns the source the error originated from, if any.
    pub fn source_key(&self) -> Option<&str> {
        match self {
            Self::Configuration(_) => None,
            Self::Source { source_key, .. } | Self::MalformedEvent { source_key, .. } => {
                Some(source_key)
            }
        }
    }
}
