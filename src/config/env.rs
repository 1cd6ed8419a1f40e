//! Environment variable overrides.

use super::types::{AppConfig, StoreBackend};
use crate::error::{NotifierError, Result};
use std::path::PathBuf;

/// Variables read by [`AppConfig::apply_env`].
const ENV_VARS: &[&str] = &[
    "BUCKET_NAME",
    "AWS_REGION",
    "AWS_ROLE_ARN",
    "AWS_ACCESS_KEY_ID",
    "AWS_SECRET_ACCESS_KEY",
    "WEBHOOK_URLS",
    "WEBHOOK_SECRET_TOKEN",
    "SLACK_WEBHOOK_URL",
    "POLL_INTERVAL_MINUTES",
    "PORT",
    "SNAPSHOT_PATH",
];

/// Names of the override variables `lookup` sets to a non-blank value.
pub fn active_overrides<F>(lookup: F) -> Vec<&'static str>
where
    F: Fn(&str) -> Option<String>,
{
    ENV_VARS
        .iter()
        .copied()
        .filter(|name| lookup(name).is_some_and(|v| !v.trim().is_empty()))
        .collect()
}

impl AppConfig {
    /// Apply overrides from the process environment.
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|name| std::env::var(name).ok())
    }

    /// Apply overrides from `lookup`. Empty values count as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(name) = get("BUCKET_NAME") {
            self.bucket.name = name;
        }
        if let Some(region) = get("AWS_REGION") {
            self.bucket.region = Some(region);
        }
        if let Some(role) = get("AWS_ROLE_ARN") {
            self.bucket.role_arn = Some(role);
        }
        if let Some(key_id) = get("AWS_ACCESS_KEY_ID") {
            self.bucket.access_key_id = Some(key_id);
        }
        if let Some(secret) = get("AWS_SECRET_ACCESS_KEY") {
            self.bucket.secret_access_key = Some(secret);
        }

        if let Some(urls) = get("WEBHOOK_URLS") {
            self.notify.webhook_urls = split_list(&urls);
        }
        if let Some(token) = get("WEBHOOK_SECRET_TOKEN") {
            self.notify.webhook_token = Some(token);
        }
        if let Some(url) = get("SLACK_WEBHOOK_URL") {
            self.notify.chat_url = Some(url);
        }

        if let Some(minutes) = get("POLL_INTERVAL_MINUTES") {
            let minutes: u64 = minutes.parse().map_err(|_| {
                NotifierError::config(format!(
                    "POLL_INTERVAL_MINUTES must be a whole number of minutes, got '{minutes}'"
                ))
            })?;
            self.schedule.interval = format!("{minutes}m");
        }
        if let Some(port) = get("PORT") {
            self.server.port = port.parse().map_err(|_| {
                NotifierError::config(format!("PORT must be a port number, got '{port}'"))
            })?;
        }
        if let Some(path) = get("SNAPSHOT_PATH") {
            self.store.backend = StoreBackend::File;
            self.store.path = Some(PathBuf::from(path));
        }

        Ok(())
    }
}

/// Split a comma-separated list, dropping blank entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
