//! Log setup shared by the roomfeed binaries.
//!
//! Logs go to stderr so stdout stays reserved for the feed itself.
//!
//! ```ignore
//! use roomfeed_core::tracing::{init_tracing, TracingConfig};
//!
//! init_tracing(TracingConfig::default())?;
//! ```

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    prelude::*,
    util::TryInitError,
};

/// Errors from [`init_tracing`].
#[derive(Debug, Error)]
pub enum TracingError {
    #[error("tracing is already initialized: {0}")]
    AlreadyInitialized(#[from] TryInitError),

    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
}

/// How log lines are written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TracingOutputFormat {
    /// One human-readable line per event.
    #[default]
    Compact,
    /// One JSON object per line.
    Json,
}

/// Logging options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TracingConfig {
    /// Level for roomfeed crates when neither `filter` nor `RUST_LOG` is set.
    pub level: Level,
    pub format: TracingOutputFormat,
    /// Print file and line of each event.
    pub with_location: bool,
    pub with_timestamp: bool,
    /// Log span open/close, useful to time per-room fetches.
    pub with_spans: bool,
    /// Explicit filter directive, takes precedence over `RUST_LOG`.
    pub filter: Option<String>,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: Level::WARN,
            format: TracingOutputFormat::Compact,
            with_location: false,
            with_timestamp: true,
            with_spans: false,
            filter: None,
        }
    }
}

impl TracingConfig {
    /// `--debug` runs: debug level with source locations, no timestamps.
    #[must_use]
    pub fn cli_debug() -> Self {
        Self {
            level: Level::DEBUG,
            with_location: true,
            with_timestamp: false,
            ..Self::default()
        }
    }

    /// Unattended runs whose output is collected: JSON at info level, with
    /// span timings.
    #[must_use]
    pub fn service() -> Self {
        Self {
            level: Level::INFO,
            format: TracingOutputFormat::Json,
            with_location: true,
            with_spans: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    #[must_use]
    pub fn with_format(mut self, format: TracingOutputFormat) -> Self {
        self.format = format;
        self
    }

    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    /// The directive used when neither `filter` nor `RUST_LOG` is set.
    ///
    /// Matches every `roomfeed_*` crate target.
    pub fn default_directive(&self) -> String {
        format!("roomfeed={}", self.level.as_str().to_ascii_lowercase())
    }

    fn env_filter(&self) -> Result<EnvFilter, TracingError> {
        match self.filter {
            Some(ref directive) => Ok(EnvFilter::try_new(directive)?),
            None => Ok(EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(self.default_directive()))),
        }
    }
}

/// Installs the global subscriber. Call once at process start.
pub fn init_tracing(config: TracingConfig) -> Result<(), TracingError> {
    let filter = config.env_filter()?;
    let spans = if config.with_spans {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(config.with_location)
        .with_line_number(config.with_location)
        .with_target(config.with_location)
        .with_span_events(spans);

    let layer = match (config.format, config.with_timestamp) {
        (TracingOutputFormat::Json, _) => base.json().boxed(),
        (TracingOutputFormat::Compact, true) => base.compact().boxed(),
        (TracingOutputFormat::Compact, false) => base.compact().without_time().boxed(),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(layer)
        .try_init()?;
    Ok(())
}
