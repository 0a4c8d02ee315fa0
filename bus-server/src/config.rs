//! Process configuration from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::directions::DirectionsConfig;
use crate::ingest::{DEFAULT_TTL_DAYS, IngestConfig};
use crate::matcher::MatcherConfig;

const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Error loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {var}={value:?}: {message}")]
pub struct ConfigError {
    pub var: &'static str,
    pub value: String,
    pub message: String,
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_addr: SocketAddr,

    /// Provider API key; external lookups need it unless a mock directory is set.
    pub directions_api_key: Option<String>,
    pub directions_base_url: Option<String>,
    pub directions_timeout_secs: u64,

    /// Whether a local miss may call the provider.
    pub directions_enabled: bool,

    /// Serve provider responses from JSON files in this directory.
    pub directions_mock_dir: Option<PathBuf>,

    /// Where the stores are saved between runs.
    pub snapshot_path: Option<PathBuf>,

    pub similarity_floor: f64,
    pub trip_ttl_days: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            directions_api_key: None,
            directions_base_url: None,
            directions_timeout_secs: DEFAULT_TIMEOUT_SECS,
            directions_enabled: false,
            directions_mock_dir: None,
            snapshot_path: None,
            similarity_floor: 0.0,
            trip_ttl_days: DEFAULT_TTL_DAYS,
        }
    }
}

impl AppConfig {
    /// Read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        Ok(Self {
            bind_addr: parse(
                "BUS_BIND_ADDR",
                get("BUS_BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            )?,
            directions_api_key: get("DIRECTIONS_API_KEY"),
            directions_base_url: get("DIRECTIONS_BASE_URL"),
            directions_timeout_secs: get("DIRECTIONS_TIMEOUT_SECS")
                .map(|v| parse("DIRECTIONS_TIMEOUT_SECS", v))
                .transpose()?
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
            directions_enabled: get("DIRECTIONS_ENABLED")
                .map(|v| parse_flag("DIRECTIONS_ENABLED", v))
                .transpose()?
                .unwrap_or(false),
            directions_mock_dir: get("DIRECTIONS_MOCK_DIR").map(PathBuf::from),
            snapshot_path: get("BUS_SNAPSHOT_PATH").map(PathBuf::from),
            similarity_floor: get("MATCH_SIMILARITY_FLOOR")
                .map(|v| parse("MATCH_SIMILARITY_FLOOR", v))
                .transpose()?
                .unwrap_or(0.0),
            trip_ttl_days: get("TRIP_TTL_DAYS")
                .map(|v| parse("TRIP_TTL_DAYS", v))
                .transpose()?
                .unwrap_or(DEFAULT_TTL_DAYS),
        })
    }

    pub fn matcher(&self) -> MatcherConfig {
        MatcherConfig::default().with_similarity_floor(self.similarity_floor)
    }

    pub fn ingest(&self) -> IngestConfig {
        IngestConfig::default().with_ttl_days(self.trip_ttl_days)
    }

    /// Live client settings, if an API key is configured.
    pub fn directions(&self) -> Option<DirectionsConfig> {
        let key = self.directions_api_key.as_deref()?;
        let mut config = DirectionsConfig::new(key).with_timeout(self.directions_timeout_secs);
        if let Some(url) = &self.directions_base_url {
            config = config.with_base_url(url.clone());
        }
        Some(config)
    }
}

fn parse<T>(var: &'static str, value: String) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError {
        var,
        message: e.to_string(),
        value,
    })
}

fn parse_flag(var: &'static str, value: String) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ConfigError {
            var,
            value,
            message: "expected true or false".to_string(),
        }),
    }
}
