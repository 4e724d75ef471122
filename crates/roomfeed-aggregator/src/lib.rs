//! Room calendar aggregation engine.
//!
//! Fetches the events of several calendar resources concurrently through a
//! [`SourceClient`](roomfeed_sources::SourceClient), normalizes them into
//! [`CanonicalEvent`](roomfeed_core::CanonicalEvent)s and returns a single
//! bounded feed in chronological order.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use roomfeed_aggregator::{AggregationConfig, Aggregator};
//!
//! let config = AggregationConfig::new(["seminar1@example.com", "seminar2@example.com"])
//!     .with_result_cap(5)
//!     .validate()?;
//! let aggregator = Aggregator::new(Arc::new(client));
//! let feed = aggregator.aggregate(&config).await?;
//! ```

pub mod aggregator;
pub mod config;
pub mod error;

pub use aggregator::{Aggregator, FeedReport, SourceFailure};
pub use config::{AggregationConfig, ConfigError, DEFAULT_FETCH_TIMEOUT, DEFAULT_RESULT_CAP};
pub use error::{AggregateError, AggregateResult, ErrorKind};
