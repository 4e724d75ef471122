//! Default command: aggregate the configured rooms and print the feed.

use std::sync::Arc;

use chrono::{Local, TimeZone};
use roomfeed_aggregator::{Aggregator, FeedReport};
use roomfeed_core::CanonicalEvent;
use roomfeed_sources::graph::GraphSourceClient;
use serde_json::json;
use tracing::info;

use crate::cli::Cli;
use crate::config::RoomfeedConfig;
use crate::error::{ClientError, ClientResult};

/// Text printed when the feed is empty.
pub const NO_EVENTS_TEXT: &str = "No upcoming events";

/// Runs one aggregation against Microsoft Graph and prints the result.
pub async fn run(cli: &Cli, config: &RoomfeedConfig) -> ClientResult<()> {
    let aggregation = config.aggregation_config()?;
    let graph = config.graph_config()?;
    let client = GraphSourceClient::new(graph)?;
    let aggregator = Aggregator::new(Arc::new(client));

    info!(rooms = aggregation.sources().len(), "fetching feed");

    let output = if cli.best_effort {
        let report = aggregator.aggregate_best_effort(&aggregation).await?;
        for failure in &report.failures {
            eprintln!("warning: {}", failure.error);
        }
        if cli.json {
            render_report_json(&report)?
        } else {
            render_table(&report.events, &Local)
        }
    } else {
        let events = aggregator.aggregate(&aggregation).await?;
        if cli.json {
            render_json(&events)?
        } else {
            render_table(&events, &Local)
        }
    };

    println!("{}", output);
    Ok(())
}

/// Renders the feed as a JSON array.
pub fn render_json(events: &[CanonicalEvent]) -> ClientResult<String> {
    serde_json::to_string_pretty(events)
        .map_err(|e| ClientError::Output(format!("failed to serialize events: {}", e)))
}

/// Renders a best-effort report as `{"events": [...], "failures": [...]}`.
pub fn render_report_json(report: &FeedReport) -> ClientResult<String> {
    let failures: Vec<_> = report
        .failures
        .iter()
        .map(|failure| {
            json!({
                "sourceKey": failure.source_key,
                "kind": failure.error.kind().as_str(),
                "message": failure.error.to_string(),
            })
        })
        .collect();

    serde_json::to_string_pretty(&json!({
        "events": report.events,
        "failures": failures,
    }))
    .map_err(|e| ClientError::Output(format!("failed to serialize report: {}", e)))
}

/// Renders the feed as one line per event, with times shown in `tz`.
pub fn render_table<Tz>(events: &[CanonicalEvent], tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    if events.is_empty() {
        return NO_EVENTS_TEXT.to_string();
    }

    events
        .iter()
        .map(|event| {
            let start = event.start_time.with_timezone(tz);
            let end = event.end_time.with_timezone(tz);
            format!(
                "{} {}-{}  {:<24}  {}",
                start.format("%a %Y-%m-%d"),
                start.format("%H:%M"),
                end.format("%H:%M"),
                room_label(event),
                event.display_subject()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// The location name if the provider sent one, otherwise the source key.
fn room_label(event: &CanonicalEvent) -> &str {
    event
        .location
        .as_ref()
        .map(|location| location.name.as_str())
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(&event.source_key)
}
