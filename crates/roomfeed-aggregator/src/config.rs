//! Aggregation configuration.

use std::time::Duration;

use roomfeed_core::DEFAULT_WINDOW_DAYS;
use thiserror::Error;

/// Default number of events returned by one aggregation.
pub const DEFAULT_RESULT_CAP: usize = 5;

/// Default upper bound on a single source fetch.
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// An invalid aggregation configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("no calendar sources configured")]
    NoSources,

    #[error("source keys must not be empty")]
    EmptySourceKey,

    #[error("result cap must be greater than zero")]
    ZeroResultCap,

    #[error("window must span at least one day")]
    ZeroWindow,

    #[error("fetch timeout must be greater than zero")]
    ZeroFetchTimeout,

    #[error("a {days} day window starting {start} is out of range")]
    WindowOutOfRange { start: chrono::NaiveDate, days: u32 },
}

/// What to aggregate and how much of it.
///
/// Built once and passed to every aggregation call by reference. Source
/// keys keep their configured order, which is also the tie-break order of
/// the merged feed. Repeated keys are kept once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregationConfig {
    sources: Vec<String>,
    result_cap: usize,
    window_days: u32,
    fetch_timeout: Duration,
}

impl AggregationConfig {
    /// Creates a configuration for `sources` with the default cap, window
    /// and timeout.
    pub fn new<I, S>(sources: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut unique: Vec<String> = Vec::new();
        for source in sources {
            let source = source.into();
            if !unique.contains(&source) {
                unique.push(source);
            }
        }

        Self {
            sources: unique,
            result_cap: DEFAULT_RESULT_CAP,
            window_days: DEFAULT_WINDOW_DAYS,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }

    /// Builder method to set the result cap.
    pub fn with_result_cap(mut self, cap: usize) -> Self {
        self.result_cap = cap;
        self
    }

    /// Builder method to set the window length in days.
    pub fn with_window_days(mut self, days: u32) -> Self {
        self.window_days = days;
        self
    }

    /// Builder method to set the per-source fetch timeout.
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Checks the configuration, returning it unchanged if valid.
    pub fn validate(self) -> Result<Self, ConfigError> {
        self.check()?;
        Ok(self)
    }

    pub(crate) fn check(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if self.sources.iter().any(|s| s.trim().is_empty()) {
            return Err(ConfigError::EmptySourceKey);
        }
        if self.result_cap == 0 {
            return Err(ConfigError::ZeroResultCap);
        }
        if self.window_days == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.fetch_timeout.is_zero() {
            return Err(ConfigError::ZeroFetchTimeout);
        }
        Ok(())
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn result_cap(&self) -> usize {
        self.result_cap
    }

    pub fn window_days(&self) -> u32 {
        self.window_days
    }

    pub fn fetch_timeout(&self) -> Duration {
        self.fetch_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = AggregationConfig::new(["room-a"]);
        assert_eq!(config.sources(), ["room-a"]);
        assert_eq!(config.result_cap(), 5);
        assert_eq!(config.window_days(), 60);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn builders() {
        let config = AggregationConfig::new(vec!["room-a".to_string(), "room-b".to_string()])
            .with_result_cap(10)
            .with_window_days(7)
            .with_fetch_timeout(Duration::from_secs(3))
            .validate()
            .unwrap();

        assert_eq!(config.sources().len(), 2);
        assert_eq!(config.result_cap(), 10);
        assert_eq!(config.window_days(), 7);
        assert_eq!(config.fetch_timeout(), Duration::from_secs(3));
    }

    #[test]
    fn repeated_sources_kept_once_in_order() {
        let config = AggregationConfig::new(["room-b", "room-a", "room-b"]);
        assert_eq!(config.sources(), ["room-b", "room-a"]);
    }

    #[test]
    fn rejects_invalid_values() {
        let none: [&str; 0] = [];
        assert_eq!(
            AggregationConfig::new(none).validate(),
            Err(ConfigError::NoSources)
        );
        assert_eq!(
            AggregationConfig::new(["room-a", "  "]).validate(),
            Err(ConfigError::EmptySourceKey)
        );
        assert_eq!(
            AggregationConfig::new(["room-a"])
                .with_result_cap(0)
                .validate(),
            Err(ConfigError::ZeroResultCap)
        );
        assert_eq!(
            AggregationConfig::new(["room-a"])
                .with_window_days(0)
                .validate(),
            Err(ConfigError::ZeroWindow)
        );
        assert_eq!(
            AggregationConfig::new(["room-a"])
                .with_fetch_timeout(Duration::ZERO)
                .validate(),
            Err(ConfigError::ZeroFetchTimeout)
        );
    }
}
