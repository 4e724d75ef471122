//! Microsoft Graph calendarView client.
//!
//! Reads the events of one room mailbox through
//! `GET /users/{mailbox}/calendarView`, following `@odata.nextLink` until
//! enough events have been collected, and flattens Graph's JSON into
//! [`RawEvent`]s.

use std::time::Duration;

use chrono::{DateTime, FixedOffset, LocalResult, NaiveDateTime, Offset, TimeZone};
use reqwest::StatusCode;
use roomfeed_core::FetchWindow;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{SourceError, SourceResult};
use crate::raw_event::{RawEmailAddress, RawEvent, RawLocation, RawOrganizer};
use crate::source::FetchRequest;

/// Page size requested when the caller gave no cap.
const DEFAULT_PAGE_SIZE: usize = 50;

/// HTTP client for the Graph calendar API.
#[derive(Debug, Clone)]
pub struct GraphCalendarClient {
    http_client: reqwest::Client,
    api_base: String,
}

impl GraphCalendarClient {
    /// Creates a new client against `api_base` with a per-request timeout.
    pub fn new(api_base: impl Into<String>, timeout: Duration) -> SourceResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                SourceError::unavailable(format!("failed to create HTTP client: {}", e))
                    .with_cause(e)
            })?;

        Ok(Self {
            http_client,
            api_base: api_base.into(),
        })
    }

    /// Returns the underlying HTTP client, shared with the token request.
    pub(crate) fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    fn calendar_view_url(&self, mailbox: &str) -> String {
        format!(
            "{}/users/{}/calendarView",
            self.api_base,
            urlencoding::encode(mailbox)
        )
    }

    /// Lists the events of `mailbox` in the request window, start-ascending.
    ///
    /// Stops paging once `request.max_results` events were collected.
    pub async fn calendar_view(
        &self,
        access_token: &str,
        mailbox: &str,
        request: &FetchRequest,
    ) -> SourceResult<Vec<RawEvent>> {
        let page_size = request.max_results.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
        let top = page_size.to_string();
        let start = request.window.start_param();
        let end = request.window.end_param();

        let mut events = Vec::new();
        let mut next_link: Option<String> = None;

        loop {
            let builder = match next_link.take() {
                Some(link) => self.http_client.get(link),
                None => self.http_client.get(self.calendar_view_url(mailbox)).query(&[
                    ("startDateTime", start.as_str()),
                    ("endDateTime", end.as_str()),
                    ("$top", top.as_str()),
                    ("$orderby", "start/dateTime"),
                ]),
            };

            let response = builder
                .bearer_auth(access_token)
                .header("Prefer", "outlook.timezone=\"UTC\"")
                .send()
                .await
                .map_err(|e| transport_error(e).with_source_key(mailbox))?;

            let status = response.status();
            let body = response.text().await.map_err(|e| {
                SourceError::unavailable(format!("failed to read response: {}", e))
                    .with_source_key(mailbox)
            })?;

            if !status.is_success() {
                return Err(status_error(status, &body).with_source_key(mailbox));
            }

            let page: CalendarViewResponse = serde_json::from_str(&body).map_err(|e| {
                SourceError::unavailable(format!("invalid calendarView response: {}", e))
                    .with_source_key(mailbox)
                    .with_cause(e)
            })?;

            debug!(
                mailbox,
                count = page.value.len(),
                more = page.next_link.is_some(),
                "fetched calendarView page"
            );

            // Graph returns events that overlap the window, including ones that
            // started before it. Only in-window starts count toward the cap.
            events.extend(
                page.value
                    .into_iter()
                    .map(convert_event)
                    .filter(|event| starts_in_window(event, &request.window)),
            );

            if let Some(max) = request.max_results
                && events.len() >= max
            {
                events.truncate(max);
                break;
            }

            match page.next_link {
                Some(link) => next_link = Some(link),
                None => break,
            }
        }

        Ok(events)
    }
}

/// Events without a start are kept so the normalizer can report them.
fn starts_in_window(event: &RawEvent, window: &FetchWindow) -> bool {
    event
        .start
        .as_ref()
        .is_none_or(|start| window.contains_instant(start))
}

fn transport_error(e: reqwest::Error) -> SourceError {
    let message = if e.is_timeout() {
        format!("request timed out: {}", e)
    } else {
        format!("request failed: {}", e)
    };
    SourceError::unavailable(message).with_cause(e)
}

/// Maps a non-success Graph response to a [`SourceError`].
fn status_error(status: StatusCode, body: &str) -> SourceError {
    let detail = graph_error_message(body);
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            SourceError::auth_failure(format!("access denied ({}): {}", status, detail))
        }
        StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
            SourceError::query_rejected(format!("query rejected ({}): {}", status, detail))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            SourceError::unavailable(format!("throttled by Graph: {}", detail))
        }
        _ => SourceError::unavailable(format!("Graph API error ({}): {}", status, detail)),
    }
}

/// Extracts `error.message` from a Graph error body.
fn graph_error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        code: Option<String>,
        message: Option<String>,
    }

    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            error: ErrorDetail {
                message: Some(message),
                ..
            },
        }) => message,
        Ok(ErrorBody {
            error: ErrorDetail {
                code: Some(code), ..
            },
        }) => code,
        _ => body.to_string(),
    }
}

// Graph API response types

#[derive(Debug, Deserialize)]
struct CalendarViewResponse {
    #[serde(default)]
    value: Vec<ApiEvent>,
    #[serde(rename = "@odata.nextLink")]
    next_link: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiEvent {
    id: Option<String>,
    subject: Option<String>,
    body: Option<ApiItemBody>,
    organizer: Option<ApiRecipient>,
    location: Option<ApiLocation>,
    start: Option<ApiDateTimeTimeZone>,
    end: Option<ApiDateTimeTimeZone>,
}

#[derive(Debug, Deserialize)]
struct ApiItemBody {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiRecipient {
    email_address: Option<ApiEmailAddress>,
}

#[derive(Debug, Deserialize)]
struct ApiEmailAddress {
    name: Option<String>,
    address: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiLocation {
    display_name: Option<String>,
    unique_id: Option<String>,
    location_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiDateTimeTimeZone {
    date_time: String,
    time_zone: Option<String>,
}

fn convert_event(api: ApiEvent) -> RawEvent {
    RawEvent {
        start: api.start.as_ref().and_then(parse_date_time),
        end: api.end.as_ref().and_then(parse_date_time),
        id: api.id,
        subject: api.subject,
        body: api.body.and_then(|b| b.content),
        organizer: api.organizer.map(|o| RawOrganizer {
            email_address: o.email_address.map(|e| RawEmailAddress {
                name: e.name,
                address: e.address,
            }),
        }),
        location: api.location.map(|l| RawLocation {
            unique_id: l.unique_id,
            display_name: l.display_name,
            location_uri: l.location_uri,
        }),
    }
}

/// Resolves a Graph `dateTimeTimeZone` pair into an instant.
///
/// A missing or unknown zone is read as UTC. Ambiguous wall times resolve to
/// the earlier instant; wall times inside a DST gap are shifted forward by
/// the gap. Unparsable wall times yield `None`, which the normalizer reports
/// as a missing field.
fn parse_date_time(value: &ApiDateTimeTimeZone) -> Option<DateTime<FixedOffset>> {
    let naive = match NaiveDateTime::parse_from_str(&value.date_time, "%Y-%m-%dT%H:%M:%S%.f") {
        Ok(naive) => naive,
        Err(e) => {
            warn!(value = %value.date_time, error = %e, "unparsable Graph dateTime");
            return None;
        }
    };

    let zone = value.time_zone.as_deref().map(str::trim).unwrap_or("");
    if zone.is_empty() || zone.eq_ignore_ascii_case("utc") {
        return Some(naive.and_utc().fixed_offset());
    }

    match zone.parse::<chrono_tz::Tz>() {
        Ok(tz) => match tz.from_local_datetime(&naive) {
            LocalResult::Single(dt) | LocalResult::Ambiguous(dt, _) => Some(dt.fixed_offset()),
            LocalResult::None => {
                // Read the wall time with the offset in force before the gap.
                let before = tz
                    .offset_from_utc_datetime(&(naive - chrono::Duration::days(1)))
                    .fix();
                let shifted = before.from_local_datetime(&naive).single()?;
                Some(shifted.with_timezone(&tz).fixed_offset())
            }
        },
        Err(_) => {
            warn!(zone, "unknown time zone, assuming UTC");
            Some(naive.and_utc().fixed_offset())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dt(date_time: &str, time_zone: Option<&str>) -> ApiDateTimeTimeZone {
        ApiDateTimeTimeZone {
            date_time: date_time.to_string(),
            time_zone: time_zone.map(str::to_string),
        }
    }

    mod datetime_parsing {
        use super::*;

        #[test]
        fn utc_with_fraction() {
            let parsed = parse_date_time(&dt("2026-10-16T09:00:00.0000000", Some("UTC"))).unwrap();
            assert_eq!(parsed.to_rfc3339(), "2026-10-16T09:00:00+00:00");
        }

        #[test]
        fn missing_zone_is_utc() {
            let parsed = parse_date_time(&dt("2026-10-16T09:30:00", None)).unwrap();
            assert_eq!(parsed.to_rfc3339(), "2026-10-16T09:30:00+00:00");
        }

        #[test]
        fn iana_zone() {
            let parsed =
                parse_date_time(&dt("2026-10-16T09:00:00.0000000", Some("Europe/Rome"))).unwrap();
            assert_eq!(parsed.to_rfc3339(), "2026-10-16T09:00:00+02:00");

            let winter =
                parse_date_time(&dt("2026-12-01T09:00:00.0000000", Some("Europe/Rome"))).unwrap();
            assert_eq!(winter.to_rfc3339(), "2026-12-01T09:00:00+01:00");
        }

        #[test]
        fn dst_gap_shifts_forward() {
            // Europe/Rome jumps from 02:00 to 03:00 on 2026-03-29.
            let parsed =
                parse_date_time(&dt("2026-03-29T02:30:00.0000000", Some("Europe/Rome"))).unwrap();
            assert_eq!(parsed.to_rfc3339(), "2026-03-29T03:30:00+02:00");
        }

        #[test]
        fn dst_overlap_takes_earlier_instant() {
            // 02:30 occurs twice on 2026-10-25; the first is still CEST.
            let parsed =
                parse_date_time(&dt("2026-10-25T02:30:00.0000000", Some("Europe/Rome"))).unwrap();
            assert_eq!(parsed.to_rfc3339(), "2026-10-25T02:30:00+02:00");
        }

        #[test]
        fn unknown_zone_falls_back_to_utc() {
            let parsed =
                parse_date_time(&dt("2026-10-16T09:00:00", Some("W. Europe Standard Time")))
                    .unwrap();
            assert_eq!(parsed.offset().local_minus_utc(), 0);
        }

        #[test]
        fn garbage_is_none() {
            assert!(parse_date_time(&dt("tomorrow-ish", Some("UTC"))).is_none());
        }
    }

    mod event_conversion {
        use super::*;

        #[test]
        fn parse_calendar_view_page() {
            let json = r#"{
                "@odata.context": "https://graph.microsoft.com/v1.0/$metadata#users('seminar1%40example.com')/calendarView",
                "@odata.nextLink": "https://graph.microsoft.com/v1.0/users/seminar1@example.com/calendarView?$skip=2",
                "value": [
                    {
                        "id": "AAMkAGI2",
                        "subject": "Doe, John, Team Sync",
                        "body": {"contentType": "html", "content": "<html>agenda</html>"},
                        "start": {"dateTime": "2026-10-16T09:00:00.0000000", "timeZone": "UTC"},
                        "end": {"dateTime": "2026-10-16T10:00:00.0000000", "timeZone": "UTC"},
                        "location": {
                            "displayName": "Seminar 1",
                            "locationType": "default",
                            "uniqueId": "Seminar 1",
                            "uniqueIdType": "private",
                            "locationUri": "seminar1@example.com"
                        },
                        "organizer": {"emailAddress": {"name": "John Doe", "address": "john@example.com"}}
                    },
                    {
                        "id": "AAMkAGI3",
                        "start": {"dateTime": "2026-10-17T14:00:00.0000000", "timeZone": "UTC"},
                        "end": {"dateTime": "2026-10-17T15:00:00.0000000", "timeZone": "UTC"}
                    }
                ]
            }"#;

            let page: CalendarViewResponse = serde_json::from_str(json).unwrap();
            assert!(page.next_link.unwrap().ends_with("$skip=2"));

            let events: Vec<RawEvent> = page.value.into_iter().map(convert_event).collect();
            assert_eq!(events.len(), 2);

            let first = &events[0];
            assert_eq!(first.id.as_deref(), Some("AAMkAGI2"));
            assert_eq!(first.subject.as_deref(), Some("Doe, John, Team Sync"));
            assert_eq!(first.body.as_deref(), Some("<html>agenda</html>"));
            let email = first.organizer.as_ref().unwrap().email_address.as_ref().unwrap();
            assert_eq!(email.name.as_deref(), Some("John Doe"));
            let location = first.location.as_ref().unwrap();
            assert_eq!(location.unique_id.as_deref(), Some("Seminar 1"));
            assert_eq!(location.location_uri.as_deref(), Some("seminar1@example.com"));
            assert!(first.span().is_ok());

            let second = &events[1];
            assert!(second.organizer.is_none());
            assert!(second.location.is_none());
            assert!(second.subject.is_none());
        }

        #[test]
        fn missing_start_survives_conversion() {
            let json = r#"{"value": [{"id": "x", "end": {"dateTime": "2026-10-16T10:00:00", "timeZone": "UTC"}}]}"#;
            let page: CalendarViewResponse = serde_json::from_str(json).unwrap();
            let event = convert_event(page.value.into_iter().next().unwrap());

            assert!(event.start.is_none());
            assert!(event.end.is_some());
        }

        #[test]
        fn empty_page() {
            let page: CalendarViewResponse = serde_json::from_str("{}").unwrap();
            assert!(page.value.is_empty());
            assert!(page.next_link.is_none());
        }
    }

    mod window_filter {
        use super::*;
        use chrono::NaiveDate;

        fn window() -> FetchWindow {
            FetchWindow::starting(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 60).unwrap()
        }

        fn starting_at(rfc3339: &str) -> RawEvent {
            RawEvent {
                start: Some(DateTime::parse_from_rfc3339(rfc3339).unwrap()),
                ..RawEvent::default()
            }
        }

        #[test]
        fn drops_events_started_before_window() {
            assert!(!starts_in_window(&starting_at("2026-10-15T08:00:00+00:00"), &window()));
            assert!(starts_in_window(&starting_at("2026-10-16T00:00:00+00:00"), &window()));
        }

        #[test]
        fn drops_events_on_end_date() {
            assert!(starts_in_window(&starting_at("2026-12-14T23:00:00+00:00"), &window()));
            assert!(!starts_in_window(&starting_at("2026-12-15T08:00:00+00:00"), &window()));
        }

        #[test]
        fn keeps_events_without_start() {
            assert!(starts_in_window(&RawEvent::default(), &window()));
        }
    }

    mod error_mapping {
        use super::*;
        use crate::error::SourceErrorCode;

        #[test]
        fn status_codes() {
            let cases = [
                (StatusCode::UNAUTHORIZED, SourceErrorCode::AuthFailure),
                (StatusCode::FORBIDDEN, SourceErrorCode::AuthFailure),
                (StatusCode::BAD_REQUEST, SourceErrorCode::QueryRejected),
                (StatusCode::NOT_FOUND, SourceErrorCode::QueryRejected),
                (StatusCode::TOO_MANY_REQUESTS, SourceErrorCode::Unavailable),
                (StatusCode::SERVICE_UNAVAILABLE, SourceErrorCode::Unavailable),
                (StatusCode::INTERNAL_SERVER_ERROR, SourceErrorCode::Unavailable),
            ];
            for (status, expected) in cases {
                assert_eq!(status_error(status, "").code(), expected, "{}", status);
            }
        }

        #[test]
        fn graph_error_body_message() {
            let body = r#"{"error":{"code":"ErrorInvalidUser","message":"The requested user 'nobody@example.com' is invalid."}}"#;
            let err = status_error(StatusCode::NOT_FOUND, body);
            assert!(err.message().contains("is invalid"));

            assert_eq!(
                graph_error_message(r#"{"error":{"code":"InvalidAuthenticationToken"}}"#),
                "InvalidAuthenticationToken"
            );
            assert_eq!(graph_error_message("Bad Gateway"), "Bad Gateway");
        }
    }

    #[test]
    fn url_encodes_mailbox() {
        let client =
            GraphCalendarClient::new("https://graph.microsoft.com/v1.0", Duration::from_secs(5))
                .unwrap();
        assert_eq!(
            client.calendar_view_url("seminar 1@example.com"),
            "https://graph.microsoft.com/v1.0/users/seminar%201%40example.com/calendarView"
        );
    }
}
