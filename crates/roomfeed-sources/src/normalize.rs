//! RawEvent to CanonicalEvent conversion.
//!
//! Normalization is a pure, per-event mapping:
//! 1. Takes the mandatory start/end pair (reporting [`MalformedEvent`] if
//!    either is missing)
//! 2. Extracts organizer and location, defaulting missing sub-fields to
//!    empty strings
//! 3. Strips the booking user's name from the subject
//! 4. Passes id and body through unmodified

use roomfeed_core::{CanonicalEvent, Location, Organizer};

use crate::error::MalformedEvent;
use crate::raw_event::{RawEvent, RawLocation, RawOrganizer};

/// Converts a [`RawEvent`] from the calendar resource `source_key` into a
/// [`CanonicalEvent`].
///
/// Missing optional fields degrade to `None`. Only a missing start or end
/// time is reported, and it is up to the caller to surface it.
pub fn normalize_event(raw: &RawEvent, source_key: &str) -> Result<CanonicalEvent, MalformedEvent> {
    let span = raw.span().map_err(|field| MalformedEvent {
        event_id: raw.id.clone(),
        field,
    })?;

    Ok(CanonicalEvent {
        id: raw.id.clone(),
        source_key: source_key.to_string(),
        organizer: raw.organizer.as_ref().and_then(extract_organizer),
        location: raw.location.as_ref().map(extract_location),
        subject: extract_subject(raw.subject.as_deref()),
        body: raw.body.clone(),
        start_time: span.start,
        end_time: span.end,
    })
}

/// Normalizes every event of one source, stopping at the first malformed one.
pub fn normalize_events(
    raw_events: &[RawEvent],
    source_key: &str,
) -> Result<Vec<CanonicalEvent>, MalformedEvent> {
    raw_events
        .iter()
        .map(|raw| normalize_event(raw, source_key))
        .collect()
}

/// An organizer exists only once the provider reported an email address.
fn extract_organizer(raw: &RawOrganizer) -> Option<Organizer> {
    let email = raw.email_address.as_ref()?;
    Some(Organizer {
        name: email.name.clone().unwrap_or_default(),
        address: email.address.clone().unwrap_or_default(),
    })
}

fn extract_location(raw: &RawLocation) -> Location {
    Location {
        id: raw.unique_id.clone().unwrap_or_default(),
        name: raw.display_name.clone().unwrap_or_default(),
        uri: raw.location_uri.clone().unwrap_or_default(),
    }
}

/// Removes the booking user's name from a room subject.
///
/// Some deployments store room bookings as `"<last>, <first>, <subject>..."`.
/// When splitting on `,` yields more than two segments the second one,
/// trimmed, is returned. Anything with two or fewer segments is returned
/// as-is. This is deliberately not a CSV parser.
pub fn extract_subject(subject: Option<&str>) -> Option<String> {
    let subject = subject?;
    let mut chunks = subject.split(',');
    let _first = chunks.next();
    match (chunks.next(), chunks.next()) {
        (Some(second), Some(_)) => Some(second.trim().to_string()),
        _ => Some(subject.to_string()),
    }
}
