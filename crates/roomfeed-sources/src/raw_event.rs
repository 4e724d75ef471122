//! Raw event type returned by source clients.
//!
//! [`RawEvent`] is the single narrow value type at the source client
//! boundary. Provider adapters flatten their own (usually deeply nested)
//! representation into it, and the normalizer turns it into a
//! [`CanonicalEvent`](roomfeed_core::CanonicalEvent). Nothing downstream of
//! the adapter depends on provider SDK types.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The organizer of a raw event, as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawOrganizer {
    /// The organizer's email address block, if the provider sent one.
    pub email_address: Option<RawEmailAddress>,
}

/// A name/address pair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEmailAddress {
    pub name: Option<String>,
    pub address: Option<String>,
}

/// The location of a raw event, as reported by the provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawLocation {
    pub unique_id: Option<String>,
    pub display_name: Option<String>,
    pub location_uri: Option<String>,
}

/// A raw calendar event from a source client.
///
/// Every field is optional because providers are not trusted to send
/// complete records. `start` and `end` are nevertheless mandatory for a
/// usable event; see [`RawEvent::span`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// Provider identifier for the event.
    pub id: Option<String>,
    pub organizer: Option<RawOrganizer>,
    pub location: Option<RawLocation>,
    /// The subject exactly as the provider stored it.
    pub subject: Option<String>,
    /// Body text content (may be HTML).
    pub body: Option<String>,
    pub start: Option<DateTime<FixedOffset>>,
    pub end: Option<DateTime<FixedOffset>>,
}

/// The mandatory start/end pair of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventSpan {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
}

/// A mandatory field that a raw event can be missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MandatoryField {
    Start,
    End,
}

impl MandatoryField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::End => "end",
        }
    }
}

impl std::fmt::Display for MandatoryField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl RawEvent {
    /// Creates a raw event with the given start and end instants.
    pub fn new(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
            ..Default::default()
        }
    }

    /// Returns the start/end pair, or the first mandatory field that is
    /// missing.
    pub fn span(&self) -> Result<EventSpan, MandatoryField> {
        let start = self.start.ok_or(MandatoryField::Start)?;
        let end = self.end.ok_or(MandatoryField::End)?;
        Ok(EventSpan { start, end })
    }

    /// Builder method to set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method to set the subject.
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = Some(subject.into());
        self
    }

    /// Builder method to set the body.
    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Builder method to set an organizer with both name and address.
    pub fn with_organizer(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.organizer = Some(RawOrganizer {
            email_address: Some(RawEmailAddress {
                name: Some(name.into()),
                address: Some(address.into()),
            }),
        });
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: RawLocation) -> Self {
        self.location = Some(location);
        self
    }
}
