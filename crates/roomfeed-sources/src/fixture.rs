//! In-memory source client.
//!
//! [`StaticSourceClient`] answers fetches from literal fixtures, which makes
//! it the test double for anything built on [`SourceClient`]. It can also
//! stand in for a real backend in demos.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use tracing::debug;

use crate::error::{SourceError, SourceErrorCode, SourceResult};
use crate::raw_event::RawEvent;
use crate::source::{BoxFuture, FetchRequest, SourceClient};

#[derive(Debug, Clone)]
enum Response {
    Events(Vec<RawEvent>),
    Error(SourceErrorCode, String),
}

#[derive(Debug, Clone)]
struct Fixture {
    response: Response,
    delay: Option<Duration>,
}

/// A source client serving canned responses per source key.
///
/// Fetching an unconfigured key fails with `QueryRejected`, the way a
/// provider rejects an unknown mailbox.
#[derive(Debug, Default)]
pub struct StaticSourceClient {
    fixtures: HashMap<String, Fixture>,
    requests: Mutex<Vec<(String, FetchRequest)>>,
}

impl StaticSourceClient {
    /// Creates a client with no fixtures.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `events` for `source_key`, in the given order.
    pub fn with_events(mut self, source_key: impl Into<String>, events: Vec<RawEvent>) -> Self {
        self.fixtures.insert(
            source_key.into(),
            Fixture {
                response: Response::Events(events),
                delay: None,
            },
        );
        self
    }

    /// Fails every fetch of `source_key` with the given error.
    pub fn with_error(
        mut self,
        source_key: impl Into<String>,
        code: SourceErrorCode,
        message: impl Into<String>,
    ) -> Self {
        self.fixtures.insert(
            source_key.into(),
            Fixture {
                response: Response::Error(code, message.into()),
                delay: None,
            },
        );
        self
    }

    /// Delays the response for `source_key`. Has no effect on keys without
    /// a fixture.
    pub fn with_delay(mut self, source_key: &str, delay: Duration) -> Self {
        if let Some(fixture) = self.fixtures.get_mut(source_key) {
            fixture.delay = Some(delay);
        }
        self
    }

    /// Returns every fetch received so far, in call order.
    pub fn requests(&self) -> Vec<(String, FetchRequest)> {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    fn record(&self, source_key: &str, request: &FetchRequest) {
        self.requests
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push((source_key.to_string(), request.clone()));
    }
}

impl SourceClient for StaticSourceClient {
    fn name(&self) -> &str {
        "static"
    }

    fn fetch_events<'a>(
        &'a self,
        source_key: &'a str,
        request: FetchRequest,
    ) -> BoxFuture<'a, SourceResult<Vec<RawEvent>>> {
        self.record(source_key, &request);
        let fixture = self.fixtures.get(source_key).cloned();

        Box::pin(async move {
            let Some(fixture) = fixture else {
                return Err(SourceError::query_rejected("unknown calendar resource")
                    .with_source_key(source_key));
            };

            if let Some(delay) = fixture.delay {
                tokio::time::sleep(delay).await;
            }

            match fixture.response {
                Response::Events(events) => {
                    debug!(source = source_key, count = events.len(), "serving fixture");
                    Ok(events)
                }
                Response::Error(code, message) => {
                    Err(SourceError::new(code, message).with_source_key(source_key))
                }
            }
        })
    }
}
