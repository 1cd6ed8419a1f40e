//! Default values for configuration sections.

use super::types::{FilterConfig, NotifyConfig, ScheduleConfig, ServerConfig};
use crate::notify::DEFAULT_DISPLAY_ZONE;

/// Default poll interval.
pub const DEFAULT_POLL_INTERVAL: &str = "5m";

/// Default per-request delivery timeout.
pub const DEFAULT_NOTIFY_TIMEOUT: &str = "10s";

/// Default key suffix.
pub const DEFAULT_KEY_SUFFIX: &str = ".json";

/// Key substring skipped by default.
pub const DEFAULT_EXCLUDE: &str = "assets";

pub const DEFAULT_HOST: &str = "0.0.0.0";

pub const DEFAULT_PORT: u16 = 8080;

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            suffix: DEFAULT_KEY_SUFFIX.to_string(),
            exclude: vec![DEFAULT_EXCLUDE.to_string()],
        }
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL.to_string(),
            poll_on_start: false,
        }
    }
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            webhook_urls: Vec::new(),
            webhook_token: None,
            chat_url: None,
            timezone: DEFAULT_DISPLAY_ZONE.to_string(),
            timeout: DEFAULT_NOTIFY_TIMEOUT.to_string(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, StoreBackend};
    use std::time::Duration;

    #[test]
    fn test_app_defaults() {
        let config = AppConfig::default();
        assert!(config.bucket.name.is_empty());
        assert_eq!(config.filter.suffix, ".json");
        assert_eq!(config.filter.exclude, vec!["assets".to_string()]);
        assert_eq!(
            config.schedule.interval().unwrap(),
            Duration::from_secs(300)
        );
        assert_eq!(config.notify.timezone, "America/Los_Angeles");
        assert_eq!(config.store.backend, StoreBackend::File);
        assert_eq!(config.server.port, 8080);
    }
}
