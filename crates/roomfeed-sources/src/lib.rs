//! SourceClient contract and implementations.
//!
//! This crate sits between the aggregation engine and calendar backends:
//!
//! - [`SourceClient`] - The trait every calendar backend implements
//! - [`RawEvent`] - Provider-agnostic raw event data
//! - [`normalize_event`] - Turns a raw event into a [`CanonicalEvent`](roomfeed_core::CanonicalEvent)
//! - [`SourceError`] - Categorized fetch failures
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐    ┌─────────────────┐
//! │ Microsoft Graph │    │    fixtures     │
//! └────────┬────────┘    └────────┬────────┘
//!          │                      │
//!          ▼                      ▼
//! ┌─────────────────┐    ┌────────────────────┐
//! │GraphSourceClient│    │ StaticSourceClient │
//! └────────┬────────┘    └────────┬───────────┘
//!          │                      │
//!          │     SourceClient     │
//!          └──────────┬───────────┘
//!                     │
//!                     ▼
//!              ┌─────────────┐
//!              │  RawEvent   │
//!              └──────┬──────┘
//!                     │
//!                     ▼ normalize_event()
//!              ┌──────────────────┐
//!              │  CanonicalEvent  │
//!              └──────────────────┘
//! ```

pub mod error;
pub mod fixture;
#[cfg(feature = "graph")]
pub mod graph;
pub mod normalize;
pub mod raw_event;
pub mod source;

// Re-export main types at crate root
pub use error::{MalformedEvent, SourceError, SourceErrorCode, SourceResult};
pub use fixture::StaticSourceClient;
pub use normalize::{extract_subject, normalize_event, normalize_events};
pub use raw_event::{EventSpan, MandatoryField, RawEmailAddress, RawEvent, RawLocation, RawOrganizer};
pub use source::{BoxFuture, FetchRequest, SourceClient};
