//! Client configuration.
//!
//! Settings come from a `config.toml` file (default
//! `~/.config/roomfeed/config.toml`) and are then overridden by environment
//! variables, which may themselves come from a `.env` file:
//!
//! | variable           | setting                      |
//! |--------------------|------------------------------|
//! | `MEETING_ROOMS`    | `feed.rooms` (`,` or `;` separated) |
//! | `NUMBER_OF_EVENTS` | `feed.number_of_events`      |
//! | `WINDOW_DAYS`      | `feed.window_days`           |
//! | `USERNAME`         | `graph.username`             |
//! | `PASSWORD`         | `graph.password`             |
//! | `TENANT_ID`        | `graph.tenant_id`            |
//! | `CLIENT_ID`        | `graph.client_id`            |
//!
//! Credential values support secret references (`pass::…`, `env::…`), see
//! [`crate::secret`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use roomfeed_aggregator::{AggregationConfig, ConfigError, DEFAULT_FETCH_TIMEOUT, DEFAULT_RESULT_CAP};
use roomfeed_core::DEFAULT_WINDOW_DAYS;
use roomfeed_sources::graph::{GraphConfig, GraphCredentials};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::secret::{self, SecretError};

/// Settings that could not be loaded or resolved.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {message}", .path.display())]
    Parse { path: PathBuf, message: String },

    #[error("missing setting `{0}`")]
    Missing(&'static str),

    #[error("{var} must be a positive number, got `{value}`")]
    InvalidNumber { var: &'static str, value: String },

    #[error("failed to resolve `{field}`: {source}")]
    Secret {
        field: &'static str,
        #[source]
        source: SecretError,
    },

    #[error("invalid Graph settings: {0}")]
    Invalid(&'static str),
}

// ---------------------------------------------------------------------------
// RoomfeedConfig (config.toml)
// ---------------------------------------------------------------------------

/// Configuration for the roomfeed client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomfeedConfig {
    /// Log at debug level, same as `--debug`.
    pub debug: bool,

    /// What to aggregate.
    pub feed: FeedSettings,

    /// Microsoft Graph connection.
    pub graph: Option<GraphSettings>,
}

/// Feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    /// Room mailboxes to aggregate, in tie-break order.
    pub rooms: Vec<String>,

    /// Maximum number of events in the feed.
    pub number_of_events: usize,

    /// Days to look ahead, starting today.
    pub window_days: u32,

    /// Upper bound on one room fetch, in seconds.
    pub fetch_timeout_secs: u64,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            rooms: Vec::new(),
            number_of_events: DEFAULT_RESULT_CAP,
            window_days: DEFAULT_WINDOW_DAYS,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT.as_secs(),
        }
    }
}

/// Microsoft Graph settings.
///
/// `username` and `password` support secret references.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphSettings {
    pub username: Option<String>,
    pub password: Option<String>,
    pub tenant_id: Option<String>,
    pub client_id: Option<String>,

    /// Override for the Graph API base URL.
    pub api_base: Option<String>,

    /// Override for the identity platform authority.
    pub authority: Option<String>,

    /// HTTP request timeout in seconds.
    pub timeout_secs: Option<u64>,
}

impl RoomfeedConfig {
    /// Loads configuration from `path`, or from the default path if none is
    /// given. A missing default file yields the default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self, SettingsError> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Loads configuration from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, SettingsError> {
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|e| SettingsError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Returns the default configuration file path.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("roomfeed")
            .join("config.toml")
    }

    /// Applies overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<(), SettingsError> {
        self.apply_env(|var| std::env::var(var).ok())
    }

    /// Applies overrides from `lookup`, which maps a variable name to its
    /// value. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), SettingsError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        if let Some(rooms) = get("MEETING_ROOMS") {
            self.feed.rooms = parse_rooms(&rooms);
        }
        if let Some(value) = get("NUMBER_OF_EVENTS") {
            self.feed.number_of_events = parse_positive("NUMBER_OF_EVENTS", &value)?;
        }
        if let Some(value) = get("WINDOW_DAYS") {
            self.feed.window_days = parse_positive("WINDOW_DAYS", &value)?;
        }

        let credentials = [
            ("USERNAME", get("USERNAME")),
            ("PASSWORD", get("PASSWORD")),
            ("TENANT_ID", get("TENANT_ID")),
            ("CLIENT_ID", get("CLIENT_ID")),
        ];
        if credentials.iter().any(|(_, v)| v.is_some()) {
            let graph = self.graph.get_or_insert_with(GraphSettings::default);
            for (var, value) in credentials {
                let Some(value) = value else { continue };
                let slot = match var {
                    "USERNAME" => &mut graph.username,
                    "PASSWORD" => &mut graph.password,
                    "TENANT_ID" => &mut graph.tenant_id,
                    _ => &mut graph.client_id,
                };
                *slot = Some(value);
            }
        }

        Ok(())
    }

    /// Overrides the result cap and window from command-line flags.
    pub fn apply_flags(&mut self, limit: Option<usize>, window_days: Option<u32>) {
        if let Some(limit) = limit {
            self.feed.number_of_events = limit;
        }
        if let Some(days) = window_days {
            self.feed.window_days = days;
        }
    }

    /// Builds and validates the aggregation configuration.
    pub fn aggregation_config(&self) -> Result<AggregationConfig, ConfigError> {
        AggregationConfig::new(self.feed.rooms.iter().cloned())
            .with_result_cap(self.feed.number_of_events)
            .with_window_days(self.feed.window_days)
            .with_fetch_timeout(Duration::from_secs(self.feed.fetch_timeout_secs))
            .validate()
    }

    /// Builds the Graph client configuration, resolving secret references.
    pub fn graph_config(&self) -> Result<GraphConfig, SettingsError> {
        let graph = self.graph.as_ref().ok_or(SettingsError::Missing("graph"))?;

        let username = resolve_field(graph.username.as_deref(), "graph.username")?;
        let password = resolve_field(graph.password.as_deref(), "graph.password")?;
        let tenant_id = resolve_field(graph.tenant_id.as_deref(), "graph.tenant_id")?;
        let client_id = resolve_field(graph.client_id.as_deref(), "graph.client_id")?;

        let mut config = GraphConfig::new(GraphCredentials::new(
            username, password, tenant_id, client_id,
        ));
        if let Some(ref api_base) = graph.api_base {
            config = config.with_api_base(api_base);
        }
        if let Some(ref authority) = graph.authority {
            config = config.with_authority(authority);
        }
        if let Some(secs) = graph.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }

        config.validate().map_err(SettingsError::Invalid)?;
        Ok(config)
    }

    /// Returns a copy safe to print: literal passwords are replaced, secret
    /// references are kept.
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if let Some(ref mut graph) = config.graph
            && let Some(ref mut password) = graph.password
            && !secret::is_reference(password)
        {
            *password = "<redacted>".to_string();
        }
        config
    }
}

/// Splits a room list on `,` and `;`, dropping blanks.
pub fn parse_rooms(value: &str) -> Vec<String> {
    value
        .split([',', ';'])
        .map(str::trim)
        .filter(|room| !room.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_positive<T>(var: &'static str, value: &str) -> Result<T, SettingsError>
where
    T: std::str::FromStr + PartialEq + Default,
{
    match value.trim().parse::<T>() {
        Ok(n) if n != T::default() => Ok(n),
        _ => Err(SettingsError::InvalidNumber {
            var,
            value: value.to_string(),
        }),
    }
}

fn resolve_field(value: Option<&str>, field: &'static str) -> Result<String, SettingsError> {
    let value = value.ok_or(SettingsError::Missing(field))?;
    secret::resolve(value).map_err(|source| SettingsError::Secret { field, source })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    fn full_graph() -> GraphSettings {
        GraphSettings {
            username: Some("svc-rooms@example.com".to_string()),
            password: Some("hunter2".to_string()),
            tenant_id: Some("tenant-1".to_string()),
            client_id: Some("client-1".to_string()),
            ..Default::default()
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn toml_file() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(
                file,
                r#"
[feed]
rooms = ["seminar1@example.com", "seminar2@example.com"]
number_of_events = 8

[graph]
username = "svc-rooms@example.com"
password = "env::ROOMFEED_PASSWORD"
tenant_id = "tenant-1"
client_id = "client-1"
"#
            )
            .unwrap();

            let config = RoomfeedConfig::load(Some(file.path())).unwrap();

            assert_eq!(config.feed.rooms.len(), 2);
            assert_eq!(config.feed.number_of_events, 8);
            assert_eq!(config.feed.window_days, 60);
            assert_eq!(config.feed.fetch_timeout_secs, 30);
            let graph = config.graph.unwrap();
            assert_eq!(graph.password.as_deref(), Some("env::ROOMFEED_PASSWORD"));
        }

        #[test]
        fn debug_key() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            writeln!(file, "debug = true").unwrap();

            let config = RoomfeedConfig::load_from(file.path()).unwrap();

            assert!(config.debug);
            assert!(!RoomfeedConfig::default().debug);
        }

        #[test]
        fn empty_file_is_default() {
            let file = tempfile::NamedTempFile::new().unwrap();
            let config = RoomfeedConfig::load_from(file.path()).unwrap();
            assert_eq!(config, RoomfeedConfig::default());
        }

        #[test]
        fn missing_explicit_file_errors() {
            let dir = tempfile::tempdir().unwrap();
            let err = RoomfeedConfig::load(Some(dir.path().join("nope.toml").as_path())).unwrap_err();
            assert!(matches!(err, SettingsError::Read { .. }));
        }

        #[test]
        fn invalid_toml_errors() {
            let mut file = tempfile::NamedTempFile::new().unwrap();
            write!(file, "[feed\nrooms = 1").unwrap();
            let err = RoomfeedConfig::load_from(file.path()).unwrap_err();
            assert!(matches!(err, SettingsError::Parse { .. }));
        }

        #[test]
        fn default_path_ends_with_roomfeed() {
            assert!(
                RoomfeedConfig::default_path().ends_with(Path::new("roomfeed").join("config.toml"))
            );
        }
    }

    mod environment {
        use super::*;

        #[test]
        fn rooms_split_on_both_separators() {
            assert_eq!(
                parse_rooms(" a@example.com, b@example.com;c@example.com ;; "),
                ["a@example.com", "b@example.com", "c@example.com"]
            );
            assert!(parse_rooms("").is_empty());
        }

        #[test]
        fn overrides_file_values() {
            let mut config = RoomfeedConfig {
                feed: FeedSettings {
                    rooms: vec!["old@example.com".to_string()],
                    ..Default::default()
                },
                ..Default::default()
            };

            config
                .apply_env(env(&[
                    ("MEETING_ROOMS", "a@example.com;b@example.com"),
                    ("NUMBER_OF_EVENTS", "3"),
                    ("WINDOW_DAYS", "14"),
                ]))
                .unwrap();

            assert_eq!(config.feed.rooms, ["a@example.com", "b@example.com"]);
            assert_eq!(config.feed.number_of_events, 3);
            assert_eq!(config.feed.window_days, 14);
            assert!(config.graph.is_none());
        }

        #[test]
        fn credentials_create_graph_section() {
            let mut config = RoomfeedConfig::default();
            config
                .apply_env(env(&[("USERNAME", "svc@example.com"), ("TENANT_ID", "t-9")]))
                .unwrap();

            let graph = config.graph.unwrap();
            assert_eq!(graph.username.as_deref(), Some("svc@example.com"));
            assert_eq!(graph.tenant_id.as_deref(), Some("t-9"));
            assert!(graph.password.is_none());
        }

        #[test]
        fn empty_values_are_ignored() {
            let mut config = RoomfeedConfig::default();
            config
                .apply_env(env(&[("NUMBER_OF_EVENTS", ""), ("PASSWORD", "  ")]))
                .unwrap();
            assert_eq!(config.feed.number_of_events, 5);
            assert!(config.graph.is_none());
        }

        #[test]
        fn invalid_numbers_are_errors() {
            let mut config = RoomfeedConfig::default();
            let err = config
                .apply_env(env(&[("NUMBER_OF_EVENTS", "five")]))
                .unwrap_err();
            assert_eq!(err.to_string(), "NUMBER_OF_EVENTS must be a positive number, got `five`");

            let err = config.apply_env(env(&[("WINDOW_DAYS", "0")])).unwrap_err();
            assert!(matches!(
                err,
                SettingsError::InvalidNumber {
                    var: "WINDOW_DAYS",
                    ..
                }
            ));
        }
    }

    mod building {
        use super::*;

        #[test]
        fn aggregation_config_from_settings() {
            let mut config = RoomfeedConfig::default();
            config.feed.rooms = vec!["a@example.com".to_string(), "b@example.com".to_string()];
            config.apply_flags(Some(2), Some(7));

            let aggregation = config.aggregation_config().unwrap();
            assert_eq!(aggregation.sources(), ["a@example.com", "b@example.com"]);
            assert_eq!(aggregation.result_cap(), 2);
            assert_eq!(aggregation.window_days(), 7);
        }

        #[test]
        fn no_rooms_is_a_config_error() {
            let config = RoomfeedConfig::default();
            assert_eq!(config.aggregation_config(), Err(ConfigError::NoSources));
        }

        #[test]
        fn zero_limit_flag_is_a_config_error() {
            let mut config = RoomfeedConfig::default();
            config.feed.rooms = vec!["a@example.com".to_string()];
            config.apply_flags(Some(0), None);
            assert_eq!(config.aggregation_config(), Err(ConfigError::ZeroResultCap));
        }

        #[test]
        fn graph_config_from_settings() {
            let config = RoomfeedConfig {
                graph: Some(GraphSettings {
                    api_base: Some("http://localhost:8080/v1.0/".to_string()),
                    timeout_secs: Some(5),
                    ..full_graph()
                }),
                ..Default::default()
            };

            let graph = config.graph_config().unwrap();
            assert_eq!(graph.credentials.username, "svc-rooms@example.com");
            assert_eq!(graph.credentials.password, "hunter2");
            assert_eq!(graph.api_base, "http://localhost:8080/v1.0");
            assert_eq!(graph.timeout, Duration::from_secs(5));
        }

        #[test]
        fn graph_config_resolves_env_reference() {
            unsafe {
                std::env::set_var("_ROOMFEED_TEST_GRAPH_PASSWORD", "from-env");
            }
            let config = RoomfeedConfig {
                graph: Some(GraphSettings {
                    password: Some("env::_ROOMFEED_TEST_GRAPH_PASSWORD".to_string()),
                    ..full_graph()
                }),
                ..Default::default()
            };

            let graph = config.graph_config().unwrap();
            assert_eq!(graph.credentials.password, "from-env");
            unsafe {
                std::env::remove_var("_ROOMFEED_TEST_GRAPH_PASSWORD");
            }
        }

        #[test]
        fn graph_config_missing_pieces() {
            let err = RoomfeedConfig::default().graph_config().unwrap_err();
            assert!(matches!(err, SettingsError::Missing("graph")));

            let config = RoomfeedConfig {
                graph: Some(GraphSettings {
                    client_id: None,
                    ..full_graph()
                }),
                ..Default::default()
            };
            let err = config.graph_config().unwrap_err();
            assert_eq!(err.to_string(), "missing setting `graph.client_id`");

            let config = RoomfeedConfig {
                graph: Some(GraphSettings {
                    password: Some("env::_ROOMFEED_UNSET_PASSWORD_98765".to_string()),
                    ..full_graph()
                }),
                ..Default::default()
            };
            let err = config.graph_config().unwrap_err();
            assert!(matches!(err, SettingsError::Secret { field: "graph.password", .. }));
        }

        #[test]
        fn redacted_hides_literal_password_only() {
            let config = RoomfeedConfig {
                graph: Some(full_graph()),
                ..Default::default()
            };
            let redacted = config.redacted();
            assert_eq!(
                redacted.graph.unwrap().password.as_deref(),
                Some("<redacted>")
            );

            let config = RoomfeedConfig {
                graph: Some(GraphSettings {
                    password: Some("pass::rooms/svc".to_string()),
                    ..full_graph()
                }),
                ..Default::default()
            };
            assert_eq!(
                config.redacted().graph.unwrap().password.as_deref(),
                Some("pass::rooms/svc")
            );
        }
    }
}
