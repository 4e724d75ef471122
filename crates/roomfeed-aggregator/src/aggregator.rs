//! Fan-out/fan-in aggregation of calendar sources.
//!
//! One aggregation:
//! 1. Computes the window `[today, today + window_days)`
//! 2. Fetches every configured source concurrently, each bounded by the
//!    fetch timeout
//! 3. Normalizes each source's events, tagging them with the source key
//! 4. Concatenates in configured source order and stable-sorts by start
//! 5. Truncates to the result cap
//!
//! [`Aggregator::aggregate`] fails as a whole when any source fails.
//! [`Aggregator::aggregate_best_effort`] keeps whatever succeeded and
//! reports the rest.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Local, NaiveDate};
use futures_util::future::{join_all, try_join_all};
use roomfeed_core::{CanonicalEvent, FetchWindow};
use roomfeed_sources::{FetchRequest, SourceClient, SourceError, normalize_events};
use tracing::{debug, info, warn};

use crate::config::{AggregationConfig, ConfigError};
use crate::error::{AggregateError, AggregateResult};

/// A source that failed during a best-effort aggregation.
#[derive(Debug)]
pub struct SourceFailure {
    pub source_key: String,
    pub error: AggregateError,
}

/// The outcome of a best-effort aggregation.
#[derive(Debug, Default)]
pub struct FeedReport {
    /// The merged, sorted and truncated feed of every source that succeeded.
    pub events: Vec<CanonicalEvent>,
    /// Sources that contributed nothing because they failed, in configured
    /// order.
    pub failures: Vec<SourceFailure>,
}

impl FeedReport {
    /// Returns true if every source succeeded.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Produces a bounded, chronological feed from several calendar sources.
///
/// The aggregator owns no state besides the source client. Configuration
/// is passed per call.
#[derive(Clone)]
pub struct Aggregator {
    client: Arc<dyn SourceClient>,
}

impl Aggregator {
    /// Creates an aggregator that fetches through `client`.
    pub fn new(client: Arc<dyn SourceClient>) -> Self {
        Self { client }
    }

    /// Aggregates upcoming events starting from the host's local date.
    pub async fn aggregate(&self, config: &AggregationConfig) -> AggregateResult<Vec<CanonicalEvent>> {
        self.aggregate_on(config, Local::now().date_naive()).await
    }

    /// Aggregates upcoming events for a window starting on `today`.
    ///
    /// The first failing source aborts the aggregation. Fetches still in
    /// flight at that point are dropped and their results discarded.
    pub async fn aggregate_on(
        &self,
        config: &AggregationConfig,
        today: NaiveDate,
    ) -> AggregateResult<Vec<CanonicalEvent>> {
        let request = self.prepare(config, today)?;

        let per_source = try_join_all(
            config
                .sources()
                .iter()
                .map(|key| self.fetch_source(key, request.clone(), config.fetch_timeout())),
        )
        .await
        .inspect_err(|e| {
            // The failing fetch already logged at warn level.
            debug!(
                source = e.source_key().unwrap_or_default(),
                kind = %e.kind(),
                error = %e,
                "aggregation aborted"
            );
        })?;

        let events = merge(per_source, config.result_cap());
        info!(
            sources = config.sources().len(),
            event_count = events.len(),
            "aggregation complete"
        );
        Ok(events)
    }

    /// Aggregates upcoming events from the host's local date, keeping the
    /// results of sources that succeeded.
    pub async fn aggregate_best_effort(
        &self,
        config: &AggregationConfig,
    ) -> AggregateResult<FeedReport> {
        self.aggregate_best_effort_on(config, Local::now().date_naive())
            .await
    }

    /// Best-effort aggregation for a window starting on `today`.
    ///
    /// Only an invalid configuration fails the call. Every source runs to
    /// completion (or timeout) and failed ones are listed in the report.
    pub async fn aggregate_best_effort_on(
        &self,
        config: &AggregationConfig,
        today: NaiveDate,
    ) -> AggregateResult<FeedReport> {
        let request = self.prepare(config, today)?;

        let results = join_all(
            config
                .sources()
                .iter()
                .map(|key| self.fetch_source(key, request.clone(), config.fetch_timeout())),
        )
        .await;

        let mut per_source = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (key, result) in config.sources().iter().zip(results) {
            match result {
                Ok(events) => per_source.push(events),
                Err(error) => {
                    warn!(source = %key, kind = %error.kind(), error = %error, "source skipped");
                    failures.push(SourceFailure {
                        source_key: key.clone(),
                        error,
                    });
                }
            }
        }

        let events = merge(per_source, config.result_cap());
        info!(
            sources = config.sources().len(),
            failed = failures.len(),
            event_count = events.len(),
            "best-effort aggregation complete"
        );
        Ok(FeedReport { events, failures })
    }

    /// Validates the configuration and builds the fetch request.
    fn prepare(&self, config: &AggregationConfig, today: NaiveDate) -> AggregateResult<FetchRequest> {
        config.check()?;

        let window = FetchWindow::starting(today, config.window_days()).ok_or(
            ConfigError::WindowOutOfRange {
                start: today,
                days: config.window_days(),
            },
        )?;

        debug!(
            client = self.client.name(),
            start = %window.start,
            end = %window.end,
            cap = config.result_cap(),
            "starting aggregation"
        );

        Ok(FetchRequest::new(window).with_max_results(config.result_cap()))
    }

    /// Fetches and normalizes the events of one source.
    async fn fetch_source(
        &self,
        source_key: &str,
        request: FetchRequest,
        timeout: Duration,
    ) -> AggregateResult<Vec<CanonicalEvent>> {
        let raw_events =
            match tokio::time::timeout(timeout, self.client.fetch_events(source_key, request)).await {
                Ok(Ok(events)) => events,
                Ok(Err(error)) => {
                    warn!(source = %source_key, code = %error.code(), error = %error, "fetch failed");
                    return Err(AggregateError::from_source(source_key, error));
                }
                Err(_) => {
                    warn!(source = %source_key, timeout = ?timeout, "fetch timed out");
                    let error = SourceError::unavailable(format!(
                        "fetch timed out after {}s",
                        timeout.as_secs_f64()
                    ))
                    .with_source_key(source_key);
                    return Err(AggregateError::from_source(source_key, error));
                }
            };

        debug!(source = %source_key, event_count = raw_events.len(), "fetched events");

        normalize_events(&raw_events, source_key).map_err(|malformed| {
            warn!(
                source = %source_key,
                event_id = malformed.event_id.as_deref().unwrap_or_default(),
                field = %malformed.field,
                "malformed event"
            );
            AggregateError::MalformedEvent {
                source_key: source_key.to_string(),
                event_id: malformed.event_id,
                field: malformed.field,
            }
        })
    }
}

/// Concatenates per-source feeds in order, stable-sorts by start time and
/// keeps the first `cap` events.
fn merge(per_source: Vec<Vec<CanonicalEvent>>, cap: usize) -> Vec<CanonicalEvent> {
    let mut events: Vec<CanonicalEvent> = per_source.into_iter().flatten().collect();
    events.sort_by_key(|event| event.start_time);
    events.truncate(cap);
    events
}
