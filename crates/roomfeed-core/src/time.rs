//! Date windows for calendar fetches.
//!
//! A [`FetchWindow`] is a half-open range of calendar dates `[start, end)`
//! with no time-of-day component. Every aggregation cycle computes one window
//! (today through today plus the configured number of days) and hands the same
//! window to every source.

use chrono::{DateTime, Days, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

/// Default length of the fetch window in days.
pub const DEFAULT_WINDOW_DAYS: u32 = 60;

/// A half-open range of calendar dates `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FetchWindow {
    /// First date of the window (inclusive).
    pub start: NaiveDate,
    /// Date after the last date of the window (exclusive).
    pub end: NaiveDate,
}

impl FetchWindow {
    /// Creates a new fetch window.
    ///
    /// # Panics
    ///
    /// Panics if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        assert!(start <= end, "FetchWindow start must be <= end");
        Self { start, end }
    }

    /// Creates the window `[start, start + days)`.
    ///
    /// Returns `None` when the end date would fall outside the supported
    /// calendar range.
    pub fn starting(start: NaiveDate, days: u32) -> Option<Self> {
        let end = start.checked_add_days(Days::new(u64::from(days)))?;
        Some(Self { start, end })
    }

    /// Number of days covered by the window.
    pub fn days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// Returns true if the window covers no dates at all.
    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Checks if a date falls within this window.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date < self.end
    }

    /// Checks if an instant falls within this window, judged by its wall
    /// date in its own offset.
    pub fn contains_instant<Tz: TimeZone>(&self, instant: &DateTime<Tz>) -> bool {
        self.contains(instant.date_naive())
    }

    /// Formats the start date as `YYYY-MM-DD`.
    pub fn start_param(&self) -> String {
        self.start.format("%Y-%m-%d").to_string()
    }

    /// Formats the end date as `YYYY-MM-DD`.
    pub fn end_param(&self) -> String {
        self.end.format("%Y-%m-%d").to_string()
    }
}
