//! Core types: canonical events, fetch windows, tracing

pub mod event;
pub mod time;
pub mod tracing;

pub use event::{CanonicalEvent, Location, Organizer};
pub use time::{DEFAULT_WINDOW_DAYS, FetchWindow};
pub use tracing::{TracingConfig, TracingError, TracingOutputFormat, init_tracing};
