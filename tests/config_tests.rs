//! # Configuration Integration Tests
//!
//! This module covers the configuration-to-pick flow: loading picker
//! configuration from YAML and JSON files, environment overrides on top of
//! file values, and driving a full pick from a loaded configuration.

use cluster_picker::core::config::PickerConfig;
use cluster_picker::core::types::Endpoint;
use cluster_picker::picker::ClusterPicker;
use cluster_picker::registry::StaticRegistry;
use cluster_picker::selection::RandomSource;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::Duration;
use tempfile::TempDir;
use tokio::fs;

// Loading reads process environment for overrides, so tests serialize on this
static ENV_GUARD: Mutex<()> = Mutex::new(());

fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    ENV_GUARD.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

struct FixedSource(f64);

impl RandomSource for FixedSource {
    fn sample(&self) -> f64 {
        self.0
    }
}

/// Test a YAML config file drives a deterministic pick end to end
#[tokio::test]
async fn test_yaml_config_drives_a_pick() {
    let _env = lock_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("picker.yaml");

    let config_content = r#"
registry:
  connection_string: "zk1:2181,zk2:2181/solr"

weights:
  "10.0.0.5:8983/solr": 1.0
  "10.0.0.6:8983/solr": 3.0
"#;
    fs::write(&config_path, config_content).await.unwrap();

    let config = PickerConfig::load_from_file(&config_path).await.unwrap();

    let registry = StaticRegistry::new();
    registry.set_children(
        "/live_nodes",
        vec![
            "10.0.0.5:8983_solr".to_string(),
            "10.0.0.6:8983_solr".to_string(),
        ],
    );

    let picker = ClusterPicker::new(config, Arc::new(registry))
        .unwrap()
        .with_random_source(Box::new(FixedSource(0.5)));

    // 1:3 weights put the midpoint draw inside the heavier node's share
    let picked = picker.pick().await.unwrap();
    assert_eq!(picked, Endpoint::new("10.0.0.6:8983/solr"));
}

/// Test JSON configuration files load with the same semantics as YAML
#[tokio::test]
async fn test_json_config_loads() {
    let _env = lock_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("picker.json");

    let config_content = r#"{
  "registry": {
    "connection_string": "zk1:2181",
    "connect": {
      "session_timeout": "5s",
      "spin_delay": "250ms",
      "retries": 3
    }
  },
  "weights": {
    "10.0.0.5:8983/solr": 2.5
  }
}"#;
    fs::write(&config_path, config_content).await.unwrap();

    let config = PickerConfig::load_from_json(&config_path).await.unwrap();

    assert_eq!(config.registry.connection_string, "zk1:2181");
    assert_eq!(
        config.registry.connect.session_timeout,
        Duration::from_secs(5)
    );
    assert_eq!(
        config.registry.connect.spin_delay,
        Duration::from_millis(250)
    );
    assert_eq!(config.registry.connect.retries, 3);
    assert_eq!(
        config.weights.weight_of(&Endpoint::new("10.0.0.5:8983/solr")),
        Some(2.5)
    );
}

/// Test environment overrides take precedence over file values
#[tokio::test]
async fn test_env_overrides_apply_on_top_of_file() {
    let _env = lock_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("picker.yaml");

    let config_content = r#"
registry:
  connection_string: "zk1:2181"
  live_nodes_path: "/live_nodes"
"#;
    fs::write(&config_path, config_content).await.unwrap();

    std::env::set_var("PICKER_LIVE_NODES_PATH", "/clusters/main/live_nodes");
    let config = PickerConfig::load_from_file(&config_path).await;
    std::env::remove_var("PICKER_LIVE_NODES_PATH");

    assert_eq!(
        config.unwrap().registry.live_nodes_path,
        "/clusters/main/live_nodes"
    );
}

/// Test an unusable weight in the file fails at load time
#[tokio::test]
async fn test_bad_weight_in_file_rejected_at_load() {
    let _env = lock_env();
    let temp_dir = TempDir::new().unwrap();
    let config_path = temp_dir.path().join("picker.yaml");

    let config_content = r#"
registry:
  connection_string: "zk1:2181"

weights:
  "10.0.0.5:8983/solr": -1.0
"#;
    fs::write(&config_path, config_content).await.unwrap();

    let error = PickerConfig::load_from_file(&config_path).await.unwrap_err();
    let message = error.to_string();

    assert!(message.contains("Configuration validation failed"));
    assert!(message.contains("10.0.0.5:8983/solr"));
}

/// Test a missing configuration file is reported as a configuration error
#[tokio::test]
async fn test_missing_config_file_is_config_error() {
    let _env = lock_env();
    let error = PickerConfig::load_from_file("/nonexistent/picker.yaml")
        .await
        .unwrap_err();

    assert!(error.to_string().contains("Failed to read config file"));
}
