//! # Configuration Module
//!
//! This module handles configuration for the cluster picker. It provides the
//! configuration structures, file loading, and environment handling.
//!
//! ## Key Features
//! - YAML/JSON configuration parsing with serde
//! - Environment variable override support
//! - Fully environment-derived configuration for containerized deployments
//! - Validation with detailed error messages
//!
//! Configuration is loaded once and handed to the picker as an immutable
//! value. Nothing in this crate mutates it afterwards, so there is no
//! reload/watch machinery here.

use crate::core::error::{PickerError, PickerResult};
use crate::core::types::WeightTable;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Main picker configuration structure
///
/// This structure represents the complete configuration for a picker instance.
/// It uses serde for serialization/deserialization from YAML/JSON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PickerConfig {
    /// Registry connection and path settings
    pub registry: RegistryConfig,

    /// Relative selection weights, keyed by normalized endpoint
    /// (e.g. `10.0.0.5:8983/solr`)
    #[serde(default)]
    pub weights: WeightTable,
}

impl PickerConfig {
    /// Create a configuration with default registry paths and connect options
    pub fn new<S: Into<String>>(connection_string: S, weights: WeightTable) -> Self {
        Self {
            registry: RegistryConfig {
                connection_string: connection_string.into(),
                live_nodes_path: default_live_nodes_path(),
                aliases_path: default_aliases_path(),
                connect: ConnectOptions::default(),
            },
            weights,
        }
    }

    /// Load configuration from a YAML file
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> PickerResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PickerError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: PickerConfig = serde_yaml::from_str(&content)
            .map_err(|e| PickerError::config(format!("Failed to parse config: {}", e)))?;

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from JSON
    pub async fn load_from_json<P: AsRef<Path>>(path: P) -> PickerResult<Self> {
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PickerError::config(format!("Failed to read config file: {}", e)))?;

        let mut config: PickerConfig = serde_json::from_str(&content)
            .map_err(|e| PickerError::config(format!("Failed to parse JSON config: {}", e)))?;

        // Apply environment variable overrides
        config.apply_env_overrides()?;

        config.validate()?;
        Ok(config)
    }

    /// Build the configuration entirely from environment variables
    ///
    /// `PICKER_CONNECTION_STRING` is required. The weight table comes from
    /// numbered pairs starting at 1:
    ///
    /// ```text
    /// PICKER_NODE_1=10.0.0.5:8983/solr   PICKER_WEIGHT_1=1.0
    /// PICKER_NODE_2=10.0.0.6:8983/solr   PICKER_WEIGHT_2=3.0
    /// ```
    ///
    /// Numbering stops at the first missing `PICKER_NODE_<n>`. A node without
    /// a matching weight is a configuration error.
    pub fn from_env() -> PickerResult<Self> {
        use std::env;

        let connection_string = env::var("PICKER_CONNECTION_STRING").map_err(|_| {
            PickerError::config("PICKER_CONNECTION_STRING must be set".to_string())
        })?;

        let mut weights = WeightTable::new();
        let mut index = 1u32;
        while let Ok(node) = env::var(format!("PICKER_NODE_{}", index)) {
            let weight_var = format!("PICKER_WEIGHT_{}", index);
            let raw_weight = env::var(&weight_var).map_err(|_| {
                PickerError::config(format!("{} must be set for node '{}'", weight_var, node))
            })?;
            let weight: f64 = raw_weight
                .parse()
                .map_err(|e| PickerError::config(format!("Invalid {}: {}", weight_var, e)))?;
            weights.insert(node, weight);
            index += 1;
        }

        let mut config = Self::new(connection_string, weights);
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Apply environment variable overrides to configuration
    ///
    /// Environment variables follow the pattern: PICKER_<FIELD>
    /// For example: PICKER_SESSION_TIMEOUT=5s
    pub fn apply_env_overrides(&mut self) -> PickerResult<()> {
        use std::env;

        if let Ok(connection_string) = env::var("PICKER_CONNECTION_STRING") {
            self.registry.connection_string = connection_string;
        }

        if let Ok(path) = env::var("PICKER_LIVE_NODES_PATH") {
            self.registry.live_nodes_path = path;
        }

        // An empty value disables alias retrieval entirely
        if let Ok(path) = env::var("PICKER_ALIASES_PATH") {
            self.registry.aliases_path = if path.is_empty() { None } else { Some(path) };
        }

        if let Ok(timeout) = env::var("PICKER_SESSION_TIMEOUT") {
            self.registry.connect.session_timeout = humantime::parse_duration(&timeout)
                .map_err(|e| {
                    PickerError::config(format!("Invalid PICKER_SESSION_TIMEOUT: {}", e))
                })?;
        }

        if let Ok(delay) = env::var("PICKER_SPIN_DELAY") {
            self.registry.connect.spin_delay = humantime::parse_duration(&delay)
                .map_err(|e| PickerError::config(format!("Invalid PICKER_SPIN_DELAY: {}", e)))?;
        }

        if let Ok(retries) = env::var("PICKER_RETRIES") {
            self.registry.connect.retries = retries
                .parse()
                .map_err(|e| PickerError::config(format!("Invalid PICKER_RETRIES: {}", e)))?;
        }

        Ok(())
    }

    /// Configuration validation with detailed error messages
    pub fn validate(&self) -> PickerResult<()> {
        let mut errors = Vec::new();

        if self.registry.connection_string.is_empty() {
            errors.push("connection_string cannot be empty".to_string());
        }

        if self.registry.live_nodes_path.is_empty() {
            errors.push("live_nodes_path cannot be empty".to_string());
        } else if !self.registry.live_nodes_path.starts_with('/') {
            errors.push(format!(
                "live_nodes_path must be absolute, got: {}",
                self.registry.live_nodes_path
            ));
        }

        if let Some(ref aliases_path) = self.registry.aliases_path {
            if aliases_path.is_empty() {
                errors.push("aliases_path cannot be empty; omit it to disable".to_string());
            } else if !aliases_path.starts_with('/') {
                errors.push(format!("aliases_path must be absolute, got: {}", aliases_path));
            }
        }

        if self.registry.connect.session_timeout.as_millis() == 0 {
            errors.push("session_timeout must be greater than 0".to_string());
        }

        for (endpoint, weight) in self.weights.invalid_weights() {
            errors.push(format!(
                "weight for '{}' must be a positive finite number, got: {}",
                endpoint, weight
            ));
        }

        // Return all validation errors
        if !errors.is_empty() {
            return Err(PickerError::config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )));
        }

        Ok(())
    }
}

/// Registry connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Coordination service connection string (host:port[,host:port...][/chroot])
    pub connection_string: String,

    /// Path whose children are the live cluster members
    #[serde(default = "default_live_nodes_path")]
    pub live_nodes_path: String,

    /// Path whose data holds the alias map; `None` disables alias retrieval
    #[serde(default = "default_aliases_path")]
    pub aliases_path: Option<String>,

    /// Connection establishment options, passed through to the transport
    #[serde(default)]
    pub connect: ConnectOptions,
}

fn default_live_nodes_path() -> String {
    "/live_nodes".to_string()
}

fn default_aliases_path() -> Option<String> {
    Some("/aliases.json".to_string())
}

/// Connection establishment options
///
/// These are handed to the transport unmodified; the picker itself adds no
/// retry or backoff on top of them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Registry session timeout
    #[serde(with = "humantime_serde", default = "default_session_timeout")]
    pub session_timeout: Duration,

    /// Delay between connection attempts
    #[serde(with = "humantime_serde", default = "default_spin_delay")]
    pub spin_delay: Duration,

    /// Number of connection retries after the first attempt
    #[serde(default = "default_retries")]
    pub retries: u32,
}

impl Default for ConnectOptions {
    fn default() -> Self {
        Self {
            session_timeout: default_session_timeout(),
            spin_delay: default_spin_delay(),
            retries: default_retries(),
        }
    }
}

fn default_session_timeout() -> Duration {
    Duration::from_secs(3)
}

fn default_spin_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_retries() -> u32 {
    1
}
