//! Configuration types for job-scraper
//!
//! A [`Config`] is built once at startup and handed to the constructors that need
//! it; nothing reads configuration from global state afterwards.
//!
//! Sources, lowest to highest precedence:
//! 1. Built-in defaults
//! 2. A JSON file named by `CONFIG_PATH`
//! 3. Individual environment variables (`ENV`, `SCRAPER`, `READ_WRITER`, ...)

use crate::error::{Error, Result};
use crate::feeds::FeedRegistry;
use crate::scraper::{FeedScraper, MockScraper, Scraper};
use crate::store::{MockReadWriter, ReadWriter, SqliteStore};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// Environment variable naming an optional JSON config file
pub const CONFIG_PATH_ENV: &str = "CONFIG_PATH";

/// Main configuration
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Service identity, used in logs
    #[serde(default)]
    pub service: ServiceConfig,

    /// Feed client settings
    #[serde(default)]
    pub scraper: ScraperConfig,

    /// Store client settings
    #[serde(default)]
    pub store: StoreConfig,

    /// Hunt cycle settings, including the feed registry
    #[serde(default)]
    pub hunt: HuntConfig,

    /// Cycle scheduling
    #[serde(default)]
    pub schedule: SchedulerConfig,

    /// Log output
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Service identity
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Deployment environment (default: "dev")
    #[serde(default = "default_env")]
    pub env: String,

    /// Service name (default: "job-scraper")
    #[serde(default = "default_name")]
    pub name: String,

    /// Service version (default: the crate version)
    #[serde(default = "default_version")]
    pub version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            env: default_env(),
            name: default_name(),
            version: default_version(),
        }
    }
}

/// Which feed client to build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScraperKind {
    /// Fetch feeds over HTTP
    #[default]
    Feed,
    /// Return empty feeds without network access
    Mock,
}

impl FromStr for ScraperKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "feed" => Ok(ScraperKind::Feed),
            "mock" => Ok(ScraperKind::Mock),
            other => Err(Error::config(
                format!("unsupported scraper '{other}'"),
                "SCRAPER",
            )),
        }
    }
}

/// Feed client settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// Client implementation (default: feed)
    #[serde(default)]
    pub kind: ScraperKind,

    /// Per-request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout", with = "duration_serde")]
    pub request_timeout: Duration,

    /// User agent sent with feed requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            kind: ScraperKind::default(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

/// Which store client to build
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreKind {
    /// SQLite database at [`StoreConfig::location`]
    #[default]
    Sqlite,
    /// In-memory store that forgets everything on exit
    Mock,
}

impl FromStr for StoreKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sqlite" => Ok(StoreKind::Sqlite),
            "mock" => Ok(StoreKind::Mock),
            other => Err(Error::config(
                format!("unsupported readwriter '{other}'"),
                "READ_WRITER",
            )),
        }
    }
}

/// Store client settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Client implementation (default: sqlite)
    #[serde(default)]
    pub kind: StoreKind,

    /// Database file for the SQLite store (default: "job_postings.db")
    #[serde(default = "default_store_location")]
    pub location: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            kind: StoreKind::default(),
            location: default_store_location(),
        }
    }
}

/// Hunt cycle settings
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HuntConfig {
    /// Capacity of the fan-in channel between feed workers and the collector (default: 100)
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Feeds scraped every cycle (default: built-in job boards)
    #[serde(default)]
    pub feeds: FeedRegistry,
}

impl Default for HuntConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            feeds: FeedRegistry::default(),
        }
    }
}

/// Cycle scheduling
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SchedulerConfig {
    /// Time between cycle starts in seconds (default: 86400)
    #[serde(default = "default_interval", with = "duration_serde")]
    pub interval: Duration,

    /// How long to wait for in-flight cycles after stop before cancelling them
    /// (default: 30 seconds, None = wait indefinitely)
    #[serde(
        default = "default_shutdown_timeout",
        with = "optional_duration_serde"
    )]
    pub shutdown_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: default_interval(),
            shutdown_timeout: default_shutdown_timeout(),
        }
    }
}

/// Log output
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset (default: "info")
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Emit JSON lines instead of compact text
    #[serde(default)]
    pub json: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from `CONFIG_PATH` (if set) and the process environment
    pub fn load() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Like [`Config::load`], reading variables through `lookup`
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Self::from_json_file(Path::new(&path))?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a JSON config file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(
                format!("failed to read config file {}: {}", path.display(), e),
                CONFIG_PATH_ENV,
            )
        })?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Overlay non-empty environment variables onto this config
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(env) = get("ENV") {
            self.service.env = env;
        }
        if let Some(name) = get("NAME") {
            self.service.name = name;
        }
        if let Some(version) = get("VERSION") {
            self.service.version = version;
        }
        if let Some(kind) = get("SCRAPER") {
            self.scraper.kind = kind.parse()?;
        }
        if let Some(kind) = get("READ_WRITER") {
            self.store.kind = kind.parse()?;
        }
        if let Some(location) = get("READ_WRITER_LOCATION") {
            self.store.location = PathBuf::from(location);
        }
        if let Some(secs) = get("HUNT_INTERVAL_SECS") {
            self.schedule.interval = Duration::from_secs(parse_secs(&secs, "HUNT_INTERVAL_SECS")?);
        }
        if let Some(secs) = get("SHUTDOWN_TIMEOUT_SECS") {
            self.schedule.shutdown_timeout = Some(Duration::from_secs(parse_secs(
                &secs,
                "SHUTDOWN_TIMEOUT_SECS",
            )?));
        }
        if let Some(filter) = get("LOG_FILTER") {
            self.telemetry.log_filter = filter;
        }
        if let Some(json) = get("LOG_JSON") {
            self.telemetry.json = parse_bool(&json, "LOG_JSON")?;
        }

        Ok(())
    }

    /// Reject settings the hunt cycle cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.hunt.channel_capacity == 0 {
            return Err(Error::config(
                "channel capacity must be greater than zero",
                "hunt.channel_capacity",
            ));
        }
        if self.hunt.feeds.is_empty() {
            return Err(Error::config("no feeds configured", "hunt.feeds"));
        }
        self.hunt.feeds.validate()?;

        if self.schedule.interval.is_zero() {
            return Err(Error::config(
                "interval must be greater than zero",
                "schedule.interval",
            ));
        }
        if self.scraper.request_timeout.is_zero() {
            return Err(Error::config(
                "request timeout must be greater than zero",
                "scraper.request_timeout",
            ));
        }
        if self.store.kind == StoreKind::Sqlite && self.store.location.as_os_str().is_empty() {
            return Err(Error::config(
                "sqlite store needs a location",
                "READ_WRITER_LOCATION",
            ));
        }

        Ok(())
    }

    /// Build the configured feed client
    pub fn build_scraper(&self) -> Result<Arc<dyn Scraper>> {
        Ok(match self.scraper.kind {
            ScraperKind::Feed => Arc::new(FeedScraper::new(
                self.scraper.request_timeout,
                &self.scraper.user_agent,
            )?),
            ScraperKind::Mock => Arc::new(MockScraper::new()),
        })
    }

    /// Build the configured store client, opening the database if needed
    pub async fn build_store(&self) -> Result<Arc<dyn ReadWriter>> {
        Ok(match self.store.kind {
            StoreKind::Sqlite => Arc::new(SqliteStore::open(&self.store.location).await?),
            StoreKind::Mock => Arc::new(MockReadWriter::new()),
        })
    }
}

fn parse_secs(raw: &str, key: &str) -> Result<u64> {
    raw.trim()
        .parse()
        .map_err(|_| Error::config(format!("'{raw}' is not a number of seconds"), key))
}

fn parse_bool(raw: &str, key: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(Error::config(format!("'{raw}' is not a boolean"), key)),
    }
}

fn default_env() -> String {
    "dev".into()
}

fn default_name() -> String {
    "job-scraper".into()
}

fn default_version() -> String {
    env!("CARGO_PKG_VERSION").into()
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("job-scraper/", env!("CARGO_PKG_VERSION")).into()
}

fn default_store_location() -> PathBuf {
    PathBuf::from("job_postings.db")
}

fn default_channel_capacity() -> usize {
    100
}

fn default_interval() -> Duration {
    Duration::from_secs(24 * 60 * 60) // daily
}

fn default_shutdown_timeout() -> Option<Duration> {
    Some(Duration::from_secs(30))
}

fn default_log_filter() -> String {
    "info".into()
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// Optional Duration serialization helper
mod optional_duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match duration {
            Some(d) => serializer.serialize_some(&d.as_secs()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = Option::<u64>::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
