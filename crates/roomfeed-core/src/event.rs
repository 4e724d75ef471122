//! Canonical event types.
//!
//! This module provides the provider-agnostic event shape produced by the
//! aggregation engine:
//! - [`CanonicalEvent`]: one scheduled event from one calendar resource
//! - [`Organizer`]: who booked the event
//! - [`Location`]: where the event takes place
//!
//! Instances are built fresh for every aggregation and never persisted.

use chrono::{DateTime, Duration, FixedOffset};
use serde::{Deserialize, Serialize};

/// The organizer of an event.
///
/// Only present when the provider reported an organizer with an email
/// address. Missing sub-fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organizer {
    /// Display name of the organizer.
    pub name: String,
    /// Email address of the organizer.
    pub address: String,
}

impl Organizer {
    /// Creates a new organizer.
    pub fn new(name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            address: address.into(),
        }
    }
}

/// The location of an event.
///
/// Only present when the provider reported a location object. Missing
/// sub-fields are empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    /// Provider-unique identifier of the location.
    pub id: String,
    /// Human-readable name of the location.
    pub name: String,
    /// URI of the location, if the provider has one.
    pub uri: String,
}

impl Location {
    /// Creates a new location.
    pub fn new(id: impl Into<String>, name: impl Into<String>, uri: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            uri: uri.into(),
        }
    }
}

/// A normalized, provider-agnostic calendar event.
///
/// `start_time <= end_time` is expected from the provider and is not
/// re-validated here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanonicalEvent {
    /// Opaque identifier from the source provider, if it reported one.
    pub id: Option<String>,
    /// The calendar resource this event came from (e.g., a room mailbox).
    pub source_key: String,
    /// The event organizer.
    pub organizer: Option<Organizer>,
    /// The event location.
    pub location: Option<Location>,
    /// The event subject after prefix extraction.
    pub subject: Option<String>,
    /// Free-text body content, passed through unmodified.
    pub body: Option<String>,
    /// When the event starts.
    pub start_time: DateTime<FixedOffset>,
    /// When the event ends.
    pub end_time: DateTime<FixedOffset>,
}

impl CanonicalEvent {
    /// Creates a new event with the mandatory fields.
    pub fn new(
        source_key: impl Into<String>,
        start_time: DateTime<FixedOffset>,
        end_time: DateTime<FixedOffset>,
    ) -> Self {
        Self {
            id: None,
            source_key: source_key.into(),
            organizer: None,
            location: None,
            subject: None,
            body: None,
            start_time,
            end_time,
        }
    }

    /// Builder method to set the id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builder method to set the organizer.
    pub fn with_organizer(mut self, organizer: Organizer) -> Self {
        self.organizer = Some(organizer);
        self
    }

    /// Builder method to set the location.
    pub fn with_location(mut self, location: Location) -> Self {
        self.location = Some(location);
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

    /// Returns the subject, falling back to "(No subject)" if missing or blank.
    pub fn display_subject(&self) -> &str {
        self.subject
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or("(No subject)")
    }

    /// Returns how long the event lasts.
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn cest(d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(2 * 3600)
            .unwrap()
            .with_ymd_and_hms(2026, 10, d, h, min, 0)
            .unwrap()
    }

    fn sample_event() -> CanonicalEvent {
        CanonicalEvent::new("room-a@example.com", cest(16, 9, 0), cest(16, 10, 0))
            .with_id("AAMk-1")
            .with_organizer(Organizer::new("Jane Doe", "jane@example.com"))
            .with_subject("Team Sync")
    }

    #[test]
    fn new_event_has_only_mandatory_fields() {
        let event = CanonicalEvent::new("room-a", cest(16, 9, 0), cest(16, 9, 30));

        assert_eq!(event.source_key, "room-a");
        assert!(event.id.is_none());
        assert!(event.organizer.is_none());
        assert!(event.location.is_none());
        assert!(event.subject.is_none());
        assert!(event.body.is_none());
        assert_eq!(event.duration(), Duration::minutes(30));
    }

    #[test]
    fn display_subject_fallback() {
        let event = CanonicalEvent::new("room-a", cest(16, 9, 0), cest(16, 10, 0));
        assert_eq!(event.display_subject(), "(No subject)");

        let blank = event.clone().with_subject("   ");
        assert_eq!(blank.display_subject(), "(No subject)");

        let named = event.with_subject("Standup");
        assert_eq!(named.display_subject(), "Standup");
    }

    #[test]
    fn location_keeps_empty_fields() {
        let location = Location::new("", "Seminar 1", "");
        assert_eq!(location.id, "");
        assert_eq!(location.name, "Seminar 1");
        assert_eq!(location.uri, "");
    }

    #[test]
    fn serialized_shape() {
        let event = sample_event()
            .with_location(Location::new("loc-1", "Seminar 1", ""))
            .with_body("<p>Agenda</p>");

        insta::assert_json_snapshot!(event, @r#"
        {
          "id": "AAMk-1",
          "sourceKey": "room-a@example.com",
          "organizer": {
            "name": "Jane Doe",
            "address": "jane@example.com"
          },
          "location": {
            "id": "loc-1",
            "name": "Seminar 1",
            "uri": ""
          },
          "subject": "Team Sync",
          "body": "<p>Agenda</p>",
          "startTime": "2026-10-16T09:00:00+02:00",
          "endTime": "2026-10-16T10:00:00+02:00"
        }
        "#);
    }

    #[test]
    fn missing_optionals_serialize_as_null() {
        let event = CanonicalEvent::new("room-b", cest(16, 9, 0), cest(16, 10, 0));
        let json = serde_json::to_value(&event).unwrap();

        assert!(json["id"].is_null());
        assert!(json["organizer"].is_null());
        assert!(json["location"].is_null());
        assert_eq!(json["sourceKey"], "room-b");
    }

    #[test]
    fn serde_roundtrip() {
        let event = sample_event();
        let json = serde_json::to_string(&event).unwrap();
        let parsed: CanonicalEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(event, parsed);
    }
}
