//! Client error types.

use std::fmt;

use roomfeed_aggregator::{AggregateError, ConfigError};
use roomfeed_sources::SourceError;

use crate::config::SettingsError;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug)]
pub enum ClientError {
    /// Configuration error.
    Config(String),
    /// Source client could not be created.
    Source(SourceError),
    /// Aggregation failed.
    Aggregate(AggregateError),
    /// Output could not be rendered.
    Output(String),
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(msg) => write!(f, "configuration error: {}", msg),
            Self::Source(err) => write!(f, "source error: {}", err),
            Self::Aggregate(err) => write!(f, "{}", err),
            Self::Output(msg) => write!(f, "output error: {}", msg),
        }
    }
}

impl std::error::Error for ClientError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Source(err) => Some(err),
            Self::Aggregate(err) => Some(err),
            _ => None,
        }
    }
}

impl From<SettingsError> for ClientError {
    fn from(err: SettingsError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<ConfigError> for ClientError {
    fn from(err: ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<SourceError> for ClientError {
    fn from(err: SourceError) -> Self {
        Self::Source(err)
    }
}

impl From<AggregateError> for ClientError {
    fn from(err: AggregateError) -> Self {
        match err {
            AggregateError::Configuration(e) => Self::Config(e.to_string()),
            other => Self::Aggregate(other),
        }
    }
}
