//! Configuration module for bucket-notifier.
//!
//! This module provides a layered configuration system with:
//! - Type-safe configuration structures
//! - Validation that reports every problem at once
//! - YAML config file loading and discovery
//! - Environment variable overrides
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use bucket_notifier::config::AppConfig;
//!
//! // Use the builder
//! let config = AppConfig::builder()
//!     .bucket("reports")
//!     .webhook_url("https://hooks.example.com/bucket")
//!     .interval("5m")
//!     .build();
//!
//! // Or load file + environment
//! let (config, loaded_from) = bucket_notifier::config::load(None).unwrap();
//! ```
//!
//! # Configuration File
//!
//! Place a `bucket-notifier.yaml` file in the working directory or
//! `~/.config/bucket-notifier/`:
//!
//! ```yaml
//! bucket:
//!   name: reports
//! notify:
//!   webhook_urls:
//!     - https://hooks.example.com/bucket
//! ```

mod defaults;
mod env;
pub mod file;
mod types;
mod validation;

pub use defaults::{
    DEFAULT_EXCLUDE, DEFAULT_HOST, DEFAULT_KEY_SUFFIX, DEFAULT_NOTIFY_TIMEOUT,
    DEFAULT_POLL_INTERVAL, DEFAULT_PORT,
};
pub use env::active_overrides;
pub use types::{
    AppConfig, AppConfigBuilder, BucketConfig, FilterConfig, NotifyConfig, ScheduleConfig,
    ServerConfig, StoreBackend, StoreConfig, REDACTED,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, ConfigFileError,
};

use crate::error::Result;
use std::path::{Path, PathBuf};

/// Load the config file (if any) and apply process environment overrides.
///
/// The result is not validated; CLI overrides are expected to be applied
/// first, then [`AppConfig::ensure_valid`].
pub fn load(explicit_path: Option<&Path>) -> Result<(AppConfig, Option<PathBuf>)> {
    let (mut config, loaded_from) = load_or_default(explicit_path)?;
    config.apply_process_env()?;
    Ok((config, loaded_from))
}

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents every option that can be set in
/// `bucket-notifier.yaml`. Editors can use it for validation and
/// autocompletion.
#[must_use]
pub fn generate_json_schema() -> String {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_lists_sections() {
        let schema = generate_json_schema();
        for section in ["bucket", "filter", "schedule", "notify", "store", "server"] {
            assert!(schema.contains(section), "schema missing {section}");
        }
    }
}
