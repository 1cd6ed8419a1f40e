//! Configuration validation for bucket-notifier.
//!
//! Validation collects every problem instead of stopping at the first, so a
//! misconfigured deployment reports everything it needs fixed in one run.

use super::types::{
    AppConfig, BucketConfig, NotifyConfig, ScheduleConfig, ServerConfig, StoreBackend, StoreConfig,
};
use crate::error::{NotifierError, Result};
use crate::poll::parse_duration;
use std::time::Duration;

/// Longest accepted poll interval.
const MAX_POLL_INTERVAL: Duration = Duration::from_secs(365 * 86400);

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

impl AppConfig {
    /// Validate and fold every problem into one configuration error.
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            return Ok(());
        }
        let joined = errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(NotifierError::config(joined))
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.bucket.validate());
        errors.extend(self.schedule.validate());
        errors.extend(self.notify.validate());
        errors.extend(self.store.validate());
        errors.extend(self.server.validate());
        errors
    }
}

impl Validatable for BucketConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.name.trim().is_empty() {
            errors.push(ConfigError::new(
                "bucket.name",
                "Bucket name is required (set bucket.name or BUCKET_NAME)",
            ));
        }
        if self.access_key_id.is_some() != self.secret_access_key.is_some() {
            errors.push(ConfigError::new(
                "bucket.access_key_id",
                "access_key_id and secret_access_key must be set together",
            ));
        }
        errors
    }
}

impl Validatable for ScheduleConfig {
    fn validate(&self) -> Vec<ConfigError> {
        match parse_duration(&self.interval) {
            Ok(d) if d.is_zero() => vec![ConfigError::new(
                "schedule.interval",
                "Interval must be greater than zero",
            )],
            Ok(d) if d > MAX_POLL_INTERVAL => vec![ConfigError::new(
                "schedule.interval",
                "Interval must not exceed 365d",
            )],
            Ok(_) => Vec::new(),
            Err(e) => vec![ConfigError::new("schedule.interval", e.to_string())],
        }
    }
}

impl Validatable for NotifyConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        for url in &self.webhook_urls {
            if !is_http_url(url) {
                errors.push(ConfigError::new(
                    "notify.webhook_urls",
                    format!("'{url}' is not an http(s) URL"),
                ));
            }
        }

        if let Some(url) = &self.chat_url {
            if !is_http_url(url) {
                errors.push(ConfigError::new("notify.chat_url", "Not an http(s) URL"));
            }
        }

        match parse_duration(&self.timeout) {
            Ok(d) if d.is_zero() => errors.push(ConfigError::new(
                "notify.timeout",
                "Timeout must be greater than zero",
            )),
            Ok(_) => {}
            Err(e) => errors.push(ConfigError::new("notify.timeout", e.to_string())),
        }

        errors
    }
}

impl Validatable for StoreConfig {
    fn validate(&self) -> Vec<ConfigError> {
        if self.backend != StoreBackend::File {
            return Vec::new();
        }
        match self.resolved_path() {
            Ok(path) if path.is_dir() => vec![ConfigError::new(
                "store.path",
                format!("{} is a directory", path.display()),
            )],
            Ok(_) => Vec::new(),
            Err(e) => vec![ConfigError::new("store.path", e.to_string())],
        }
    }
}

impl Validatable for ServerConfig {
    fn validate(&self) -> Vec<ConfigError> {
        match self.addr() {
            Ok(_) => Vec::new(),
            Err(_) => vec![ConfigError::new(
                "server.host",
                format!("'{}' is not an IP address", self.host),
            )],
        }
    }
}

fn is_http_url(url: &str) -> bool {
    let url = url.trim();
    url.starts_with("http://") || url.starts_with("https://")
}

// ============================================================================
// Tests
// ============================================================================
