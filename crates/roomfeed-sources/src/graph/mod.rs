//! Microsoft Graph source client.
//!
//! Reads room mailbox calendars through the Graph `calendarView` endpoint,
//! authenticating with the resource-owner password grant against the
//! Microsoft identity platform.
//!
//! # Example
//!
//! ```no_run
//! use roomfeed_sources::graph::{GraphConfig, GraphCredentials, GraphSourceClient};
//!
//! let credentials = GraphCredentials::new(
//!     "svc-rooms@example.com",
//!     "secret",
//!     "tenant-id",
//!     "client-id",
//! );
//! let client = GraphSourceClient::new(GraphConfig::new(credentials))?;
//! # Ok::<(), roomfeed_sources::SourceError>(())
//! ```

mod client;
mod config;
mod source;
mod tokens;

pub use client::GraphCalendarClient;
pub use config::{
    DEFAULT_API_BASE, DEFAULT_AUTHORITY, GRAPH_SCOPE, GraphConfig, GraphCredentials,
};
pub use source::GraphSourceClient;
pub use tokens::TokenInfo;
