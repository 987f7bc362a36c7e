//! Run configuration: credentials, catalog code tables, output and timing.
//!
//! Values are layered with figment: built-in defaults, then an optional TOML
//! file, then `REINVENT_`-prefixed environment variables (nested keys use
//! `__`, e.g. `REINVENT_CREDENTIALS__PASSWORD`), then command-line overrides.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use fundu::{DurationParser, TimeUnit};
use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "reinvent.toml";

/// Ordered name → catalog code table (venues, days, session types).
pub type CodeMap = IndexMap<String, u32>;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    FileNotFound(PathBuf),
    #[error("failed to load config")]
    Load(#[from] Box<figment::Error>),
    #[error("invalid config: {0}")]
    Invalid(String),
    #[error("unknown {kind} '{name}' (known: {known})")]
    UnknownName {
        kind: &'static str,
        name: String,
        known: String,
    },
}

/// Values given on the command line. Unset fields leave the lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_path: Option<PathBuf>,
}

/// Login credentials for the catalog portal.
#[derive(custom_debug_derive::Debug, Clone, Deserialize)]
pub struct Credentials {
    pub username: String,
    #[debug(with = "crate::fmt::redacted")]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub credentials: Credentials,
    /// Calendar year of the event. The catalog's start times carry no year,
    /// so every timestamp is anchored to this value.
    pub event_year: i32,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_output_path")]
    pub output_path: PathBuf,
    /// When false, invalid TLS certificates from the portal are accepted.
    #[serde(default)]
    pub verify_tls: bool,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default = "default_venues")]
    pub venues: CodeMap,
    #[serde(default = "default_days")]
    pub days: CodeMap,
    #[serde(default = "default_session_types")]
    pub session_types: CodeMap,
    /// Pause before each "load more" request.
    #[serde(
        default = "default_request_delay",
        deserialize_with = "deserialize_duration"
    )]
    pub request_delay: Duration,
    /// Upper bound on a single HTTP request.
    #[serde(
        default = "default_page_timeout",
        deserialize_with = "deserialize_duration"
    )]
    pub page_timeout: Duration,
    #[serde(
        default = "default_page_ready_interval",
        deserialize_with = "deserialize_duration"
    )]
    pub page_ready_interval: Duration,
    #[serde(default = "default_page_ready_attempts")]
    pub page_ready_attempts: u32,
}

fn default_base_url() -> String {
    "https://www.portal.reinvent.awsevents.com".to_string()
}

fn default_output_path() -> PathBuf {
    PathBuf::from("sessions.txt")
}

fn default_log_level() -> String {
    "info".to_string()
}

fn code_map(entries: &[(&str, u32)]) -> CodeMap {
    entries
        .iter()
        .map(|&(name, code)| (name.to_string(), code))
        .collect()
}

fn default_venues() -> CodeMap {
    code_map(&[
        ("Venetian", 22188),
        ("Encore", 728),
        ("Aria", 22191),
        ("MGM", 22190),
        ("Mirage", 22583),
        ("Bellagio", 22584),
        ("Vdara", 24372),
    ])
}

fn default_days() -> CodeMap {
    code_map(&[
        ("Monday", 170),
        ("Tuesday", 31),
        ("Wednesday", 110),
        ("Thursday", 111),
        ("Friday", 112),
    ])
}

fn default_session_types() -> CodeMap {
    code_map(&[
        ("Builders Session", 1781),
        ("Chalk Talk", 1700),
        ("Demo Session", 1560),
        ("General Activity", 1140),
        ("Hackathon", 1040),
        ("Lightning Talk", 1440),
        ("Security Jam", 1640),
        ("Session", 2),
        ("Spotlight Lab", 1780),
        ("Workshop", 1000),
    ])
}

fn default_request_delay() -> Duration {
    Duration::from_secs(2)
}

fn default_page_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_page_ready_interval() -> Duration {
    Duration::from_secs(1)
}

fn default_page_ready_attempts() -> u32 {
    5
}

/// Parse a human-readable duration such as `"2s"`, `"500ms"` or `"1m"`.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let parser =
        DurationParser::with_time_units(&[TimeUnit::MilliSecond, TimeUnit::Second, TimeUnit::Minute]);
    let parsed = parser.parse(s.trim()).map_err(|e| e.to_string())?;
    Duration::try_from(parsed).map_err(|e| e.to_string())
}

/// Accepts either a bare integer (seconds) or a duration string.
fn deserialize_duration<'de, D>(deserializer: D) -> Result<Duration, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Seconds(u64),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Seconds(secs) => Ok(Duration::from_secs(secs)),
        Raw::Text(text) => parse_duration(&text).map_err(serde::de::Error::custom),
    }
}

impl Config {
    /// Load from the given TOML file (or [`DEFAULT_CONFIG_FILE`] when present),
    /// the environment and `overrides`, then validate.
    pub fn load(path: Option<&Path>, overrides: &Overrides) -> Result<Self, ConfigError> {
        let figment = match path {
            Some(explicit) => {
                if !explicit.exists() {
                    return Err(ConfigError::FileNotFound(explicit.to_path_buf()));
                }
                Figment::new().merge(Toml::file(explicit))
            }
            None => Figment::new().merge(Toml::file(DEFAULT_CONFIG_FILE)),
        };

        let config: Config = figment
            .merge(Env::prefixed("REINVENT_").split("__"))
            .merge(Serialized::defaults(overrides))
            .extract()
            .map_err(Box::new)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.credentials.username.trim().is_empty() || self.credentials.password.is_empty() {
            return Err(ConfigError::Invalid(
                "credentials.username and credentials.password are required".into(),
            ));
        }
        if !(1900..=9999).contains(&self.event_year) {
            return Err(ConfigError::Invalid(format!(
                "event_year {} is out of range",
                self.event_year
            )));
        }
        for (kind, map) in [
            ("venues", &self.venues),
            ("days", &self.days),
            ("session_types", &self.session_types),
        ] {
            if map.is_empty() {
                return Err(ConfigError::Invalid(format!("{kind} must not be empty")));
            }
        }
        if self.page_ready_attempts == 0 {
            return Err(ConfigError::Invalid(
                "page_ready_attempts must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Resolve CLI name filters against the configured code tables.
    ///
    /// Empty filters select everything, preserving configured order.
    pub fn select(
        &self,
        days: &[String],
        venues: &[String],
        types: &[String],
    ) -> Result<Selection, ConfigError> {
        let types = if types.is_empty() {
            Vec::new()
        } else {
            pick("session type", &self.session_types, types)?
                .into_iter()
                .map(|facet| facet.name)
                .collect()
        };

        Ok(Selection {
            days: pick("day", &self.days, days)?,
            venues: pick("venue", &self.venues, venues)?,
            types,
        })
    }
}

/// A named catalog code, e.g. `("Wednesday", 110)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub name: String,
    pub code: u32,
}

/// The facets one run enumerates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub days: Vec<Facet>,
    pub venues: Vec<Facet>,
    /// Session type labels to keep; empty keeps every card.
    pub types: Vec<String>,
}

fn pick(kind: &'static str, map: &CodeMap, wanted: &[String]) -> Result<Vec<Facet>, ConfigError> {
    if wanted.is_empty() {
        return Ok(map
            .iter()
            .map(|(name, &code)| Facet {
                name: name.clone(),
                code,
            })
            .collect());
    }

    wanted
        .iter()
        .map(|name| {
            map.iter()
                .find(|(known, _)| known.eq_ignore_ascii_case(name.trim()))
                .map(|(known, &code)| Facet {
                    name: known.clone(),
                    code,
                })
                .ok_or_else(|| ConfigError::UnknownName {
                    kind,
                    name: name.clone(),
                    known: map.keys().cloned().collect::<Vec<_>>().join(", "),
                })
        })
        .collect()
}
