//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
const CONFIG_FILE_NAMES: &[&str] = &[
    ".bucket-notifier.yaml",
    ".bucket-notifier.yml",
    "bucket-notifier.yaml",
    "bucket-notifier.yml",
];

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. User config directory (~/.config/bucket-notifier/)
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if let Some(path) = find_config_in_dir(&cwd) {
            return Some(path);
        }
    }

    dirs::config_dir().and_then(|dir| find_config_in_dir(&dir.join("bucket-notifier")))
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

impl From<ConfigFileError> for crate::error::NotifierError {
    fn from(err: ConfigFileError) -> Self {
        Self::Config(err.to_string())
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load the discovered config file, or defaults when none exists.
///
/// An explicit path that does not exist, or any file that fails to parse,
/// is an error: startup must not continue on a half-read configuration.
pub fn load_or_default(
    explicit_path: Option<&Path>,
) -> Result<(AppConfig, Option<PathBuf>), ConfigFileError> {
    if let Some(path) = explicit_path {
        if !path.exists() {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }
    }

    match discover_config_file(explicit_path) {
        Some(path) => {
            let config = load_config_file(&path)?;
            tracing::debug!("Loaded configuration from {}", path.display());
            Ok((config, Some(path)))
        }
        None => Ok((AppConfig::default(), None)),
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file from the defaults.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::builder().bucket("my-bucket").build();
    format!(
        r"# bucket-notifier configuration
# Place this file at bucket-notifier.yaml in the working directory or ~/.config/bucket-notifier/

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r#"# bucket-notifier configuration file
# ===================================
#
# Place it at:
#   - bucket-notifier.yaml in the working directory
#   - ~/.config/bucket-notifier/bucket-notifier.yaml for a user-wide config
#
# Environment variables override file settings; CLI flags override both.

bucket:
  # Bucket to watch (env: BUCKET_NAME)
  name: my-bucket
  # region: us-west-2              # env: AWS_REGION
  # endpoint_url: http://localhost:9000
  # role_arn: arn:aws:iam::123456789012:role/reader   # env: AWS_ROLE_ARN
  # access_key_id: AKIA...        # env: AWS_ACCESS_KEY_ID
  # secret_access_key: ...        # env: AWS_SECRET_ACCESS_KEY

filter:
  # Only keys with this suffix are watched
  suffix: .json
  # Keys containing any of these substrings are skipped
  exclude:
    - assets

schedule:
  # Poll interval: 30s, 5m, 1h (env: POLL_INTERVAL_MINUTES, in minutes)
  interval: 5m
  # Poll once immediately at startup
  poll_on_start: false

notify:
  # Generic webhooks (env: WEBHOOK_URLS, comma separated)
  webhook_urls: []
  # Sent as x-webhook-token (env: WEBHOOK_SECRET_TOKEN)
  # webhook_token: change-me
  # Chat incoming webhook (env: SLACK_WEBHOOK_URL)
  # chat_url: https://hooks.slack.com/services/...
  # Zone used for chat timestamps
  timezone: America/Los_Angeles
  # Per-request timeout
  timeout: 10s

store:
  # file or memory
  backend: file
  # Snapshot file (env: SNAPSHOT_PATH); defaults to the user data directory
  # path: /var/lib/bucket-notifier/snapshot.json

server:
  host: 0.0.0.0
  # env: PORT
  port: 8080
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("bucket-notifier.yaml");
        std::fs::write(&config_path, "bucket:\n  name: reports\n").unwrap();

        let found = find_config_in_dir(tmp.path());
        assert_eq!(found, Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");

        let yaml = r#"
bucket:
  name: reports
  region: eu-west-1
schedule:
  interval: 30s
notify:
  webhook_urls:
    - https://a.example/hook
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.bucket.name, "reports");
        assert_eq!(config.bucket.region.as_deref(), Some("eu-west-1"));
        assert_eq!(config.schedule.interval, "30s");
        assert_eq!(config.notify.webhook_urls.len(), 1);
        // untouched sections keep their defaults
        assert_eq!(config.filter.suffix, ".json");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_explicit_missing_path_is_error() {
        let result = load_or_default(Some(Path::new("/nonexistent/bucket-notifier.yaml")));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        std::fs::write(&config_path, "bucket: [unclosed").unwrap();

        let result = load_or_default(Some(&config_path));
        assert!(matches!(result, Err(ConfigFileError::Parse(_))));
    }

    #[test]
    fn test_full_example_parses() {
        let config: AppConfig = serde_yaml::from_str(&generate_full_example_config()).unwrap();
        assert_eq!(config.bucket.name, "my-bucket");
        assert_eq!(config, AppConfig::builder().bucket("my-bucket").build());
    }

    #[test]
    fn test_generate_example_config() {
        let example = generate_example_config();
        assert!(example.contains("bucket:"));
        assert!(example.contains("my-bucket"));
    }
}
