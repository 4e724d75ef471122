//! SourceClient trait definition.
//!
//! A [`SourceClient`] fetches the raw events of one calendar resource for a
//! date window. It is the only thing the aggregator knows about the calendar
//! backend: transport, retries and token refresh all live behind it.

use std::future::Future;
use std::pin::Pin;

use roomfeed_core::FetchWindow;

use crate::error::SourceResult;
use crate::raw_event::RawEvent;

/// A boxed future for async trait methods.
///
/// Boxed futures keep the trait object-safe so the aggregator can hold an
/// `Arc<dyn SourceClient>`.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Parameters of one fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    /// Dates to fetch, `[start, end)`.
    pub window: FetchWindow,
    /// Maximum number of events to ask the provider for.
    ///
    /// This is a request-side hint. Callers must not assume the provider
    /// honoured it.
    pub max_results: Option<usize>,
}

impl FetchRequest {
    /// Creates a request for the given window with no result cap.
    pub fn new(window: FetchWindow) -> Self {
        Self {
            window,
            max_results: None,
        }
    }

    /// Builder method to set max results.
    pub fn with_max_results(mut self, max: usize) -> Self {
        self.max_results = Some(max);
        self
    }
}

/// Fetches raw events from calendar resources.
///
/// # Contract
///
/// - Return events whose start falls inside `request.window`, asking the
///   provider for start-ascending order.
/// - Fail with [`SourceErrorCode::Unavailable`](crate::SourceErrorCode),
///   `AuthFailure` or `QueryRejected`.
/// - Any retry policy belongs to the implementation.
pub trait SourceClient: Send + Sync {
    /// Returns the name of this client (e.g., "graph", "static").
    fn name(&self) -> &str;

    /// Fetches the events of the calendar resource `source_key`.
    fn fetch_events<'a>(
        &'a self,
        source_key: &'a str,
        request: FetchRequest,
    ) -> BoxFuture<'a, SourceResult<Vec<RawEvent>>>;
}
