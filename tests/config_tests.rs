//! Integration tests for layered configuration loading.

use bucket_notifier::config::{self, AppConfig, StoreBackend, Validatable};
use std::collections::HashMap;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_file_then_env_then_validate() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bucket-notifier.yaml");
    std::fs::write(
        &path,
        r#"
bucket:
  name: from-file
schedule:
  interval: 1h
notify:
  webhook_urls: [https://file.example/hook]
  timezone: Europe/Berlin
store:
  backend: memory
"#,
    )
    .unwrap();

    let (mut config, loaded_from) = config::load_or_default(Some(&path)).unwrap();
    assert_eq!(loaded_from.as_deref(), Some(path.as_path()));
    assert_eq!(config.store.backend, StoreBackend::Memory);

    let env: HashMap<&str, &str> = [
        ("BUCKET_NAME", "from-env"),
        ("POLL_INTERVAL_MINUTES", "2"),
        ("WEBHOOK_SECRET_TOKEN", "tok"),
    ]
    .into_iter()
    .collect();
    config
        .apply_env(|name| env.get(name).map(|v| (*v).to_string()))
        .unwrap();

    assert_eq!(config.bucket.name, "from-env");
    assert_eq!(config.schedule.interval().unwrap(), Duration::from_secs(120));
    assert_eq!(config.notify.webhook_urls, vec!["https://file.example/hook"]);
    assert_eq!(config.notify.timezone, "Europe/Berlin");
    assert!(config.ensure_valid().is_ok());
}

#[test]
fn test_invalid_config_reports_every_field() {
    let mut config = AppConfig::default();
    config.schedule.interval = "soon".to_string();
    config.notify.timeout = "0s".to_string();
    config.server.host = "example.com".to_string();

    let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
    for expected in [
        "bucket.name",
        "schedule.interval",
        "notify.timeout",
        "server.host",
    ] {
        assert!(fields.iter().any(|f| f == expected), "missing {expected} in {fields:?}");
    }
    assert!(config.ensure_valid().is_err());
}

#[test]
fn test_show_output_hides_secrets() {
    let mut config = AppConfig::builder()
        .bucket("reports")
        .webhook_token("super-secret")
        .build();
    config.bucket.secret_access_key = Some("aws-secret".to_string());
    config.bucket.access_key_id = Some("AKIDEXAMPLE".to_string());

    let yaml = serde_yaml::to_string(&config.redacted()).unwrap();
    assert!(!yaml.contains("super-secret"));
    assert!(!yaml.contains("aws-secret"));
    assert!(yaml.contains("reports"));
}

#[test]
fn test_json_schema_is_valid_json() {
    let schema: serde_json::Value = serde_json::from_str(&config::generate_json_schema()).unwrap();
    assert_eq!(schema["title"], "AppConfig");
    assert!(schema["properties"]["notify"].is_object());
}
