//! Configuration types for bucket-notifier.
//!
//! Each section maps to one component. Helpers on the sections convert the
//! stringly file representation into the typed options the components take.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{NotifierError, Result};
use crate::lister::KeyFilter;
use crate::notify::NotifyOptions;
use crate::poll::parse_duration;

/// Placeholder shown instead of secret values.
pub const REDACTED: &str = "<redacted>";

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Top-level configuration, built once at startup and passed to
/// constructors.
///
/// Layers apply in order: defaults, YAML file, environment, CLI flags.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Bucket to watch and how to reach it
    pub bucket: BucketConfig,
    /// Which object keys take part in change detection
    pub filter: FilterConfig,
    /// Poll timing
    pub schedule: ScheduleConfig,
    /// Notification destinations
    pub notify: NotifyConfig,
    /// Snapshot persistence
    pub store: StoreConfig,
    /// HTTP trigger server
    pub server: ServerConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }

    /// A copy safe to print: credentials and tokens are masked.
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mask = |value: &Option<String>| value.as_ref().map(|_| REDACTED.to_string());
        let mut copy = self.clone();
        copy.bucket.access_key_id = mask(&self.bucket.access_key_id);
        copy.bucket.secret_access_key = mask(&self.bucket.secret_access_key);
        copy.notify.webhook_token = mask(&self.notify.webhook_token);
        copy.notify.chat_url = mask(&self.notify.chat_url);
        copy
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Bucket identity and credentials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BucketConfig {
    /// Bucket name (required)
    pub name: String,
    /// Region; the SDK default chain decides when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Custom endpoint for S3-compatible stores
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint_url: Option<String>,
    /// Role to assume before listing
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role_arn: Option<String>,
    /// Static access key id, paired with `secret_access_key`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_access_key: Option<String>,
}

#[cfg(feature = "s3")]
impl BucketConfig {
    #[must_use]
    pub fn lister_config(&self) -> crate::lister::S3ListerConfig {
        crate::lister::S3ListerConfig {
            region: self.region.clone(),
            endpoint_url: self.endpoint_url.clone(),
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            role_arn: self.role_arn.clone(),
        }
    }
}

/// Key inclusion rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FilterConfig {
    /// Only keys ending with this suffix are watched
    pub suffix: String,
    /// Keys containing any of these substrings are skipped
    pub exclude: Vec<String>,
}

impl FilterConfig {
    #[must_use]
    pub fn key_filter(&self) -> KeyFilter {
        KeyFilter::new(self.suffix.clone(), self.exclude.clone())
    }
}

/// Poll timing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Time between polls (e.g. `30s`, `5m`, `1h`)
    pub interval: String,
    /// Run a poll immediately at startup instead of after one interval
    pub poll_on_start: bool,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Result<Duration> {
        parse_duration(&self.interval)
    }
}

/// Notification destinations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct NotifyConfig {
    /// Generic webhook destinations
    pub webhook_urls: Vec<String>,
    /// Shared secret sent in the `x-webhook-token` header
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_token: Option<String>,
    /// Chat incoming-webhook URL; chat delivery is off when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_url: Option<String>,
    /// IANA zone for chat timestamps
    pub timezone: String,
    /// Per-request timeout (e.g. `10s`)
    pub timeout: String,
}

impl NotifyConfig {
    pub fn options(&self) -> Result<NotifyOptions> {
        Ok(NotifyOptions {
            webhook_urls: self.webhook_urls.clone(),
            webhook_token: self.webhook_token.clone(),
            chat_url: self.chat_url.clone(),
            display_zone: self.timezone.clone(),
            timeout: parse_duration(&self.timeout)?,
        })
    }
}

/// Where the baseline snapshot lives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON file on local disk
    #[default]
    File,
    /// Process memory; every restart bootstraps again
    Memory,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    /// Snapshot file; defaults to the user data directory
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// The snapshot file path, falling back to the platform data directory.
    pub fn resolved_path(&self) -> Result<PathBuf> {
        match &self.path {
            Some(path) => Ok(path.clone()),
            None => dirs::data_dir()
                .map(|dir| dir.join("bucket-notifier").join("snapshot.json"))
                .ok_or_else(|| {
                    NotifierError::config("no data directory available; set store.path")
                }),
        }
    }
}

/// HTTP trigger server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| NotifierError::config(format!("invalid server address: {e}")))
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with a fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn bucket(mut self, name: impl Into<String>) -> Self {
        self.config.bucket.name = name.into();
        self
    }

    pub fn region(mut self, region: impl Into<String>) -> Self {
        self.config.bucket.region = Some(region.into());
        self
    }

    pub fn webhook_url(mut self, url: impl Into<String>) -> Self {
        self.config.notify.webhook_urls.push(url.into());
        self
    }

    pub fn webhook_token(mut self, token: impl Into<String>) -> Self {
        self.config.notify.webhook_token = Some(token.into());
        self
    }

    pub fn chat_url(mut self, url: impl Into<String>) -> Self {
        self.config.notify.chat_url = Some(url.into());
        self
    }

    pub fn interval(mut self, interval: impl Into<String>) -> Self {
        self.config.schedule.interval = interval.into();
        self
    }

    pub fn store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.store.backend = StoreBackend::File;
        self.config.store.path = Some(path.into());
        self
    }

    pub const fn memory_store(mut self) -> Self {
        self.config.store.backend = StoreBackend::Memory;
        self
    }

    pub const fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}
