//! # Cluster Picker Module
//!
//! This module composes the registry client and the weighted selector into
//! the single operation callers actually use: pick one live endpoint. Every
//! pick is a full fetch-then-select cycle against the registry; nothing is
//! cached between picks, so the answer always reflects current liveness.
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use cluster_picker::core::config::PickerConfig;
//! use cluster_picker::core::types::WeightTable;
//! use cluster_picker::picker::ClusterPicker;
//! use cluster_picker::registry::StaticRegistry;
//! use std::sync::Arc;
//!
//! # async fn run() -> cluster_picker::core::error::PickerResult<()> {
//! let mut weights = WeightTable::new();
//! weights.insert("10.0.0.5:8983/solr", 2.0);
//!
//! let config = PickerConfig::new("zk1:2181,zk2:2181", weights);
//! let picker = ClusterPicker::new(config, Arc::new(StaticRegistry::new()))?;
//!
//! let endpoint = picker.pick().await?;
//! println!("sending to {}", endpoint);
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use tracing::info;

use crate::core::config::PickerConfig;
use crate::core::error::PickerResult;
use crate::core::types::{ClusterState, Endpoint};
use crate::registry::{RegistryClient, RegistryTransport};
use crate::selection::{RandomSource, ThreadRngSource, WeightedSelector};

/// One-shot weighted picker over a live cluster
///
/// Construction validates the configuration and fixes the weight table for
/// the lifetime of the picker. The transport is shared, never the sessions:
/// concurrent picks each open their own registry session.
pub struct ClusterPicker {
    registry: RegistryClient,
    selector: WeightedSelector,
    random: Box<dyn RandomSource>,
}

impl ClusterPicker {
    /// Create a picker from a validated configuration and a transport
    pub fn new(config: PickerConfig, transport: Arc<dyn RegistryTransport>) -> PickerResult<Self> {
        config.validate()?;

        info!(
            connection_string = %config.registry.connection_string,
            configured_weights = config.weights.len(),
            "Creating cluster picker"
        );

        let registry = RegistryClient::new(config.registry, transport)?;
        let selector = WeightedSelector::new(config.weights);

        Ok(Self {
            registry,
            selector,
            random: Box::new(ThreadRngSource),
        })
    }

    /// Replace the random source, pinning selection for tests
    pub fn with_random_source(mut self, random: Box<dyn RandomSource>) -> Self {
        self.random = random;
        self
    }

    /// Pick one live endpoint, biased by the configured weights
    pub async fn pick(&self) -> PickerResult<Endpoint> {
        let state = self.registry.fetch_cluster_state().await?;
        self.selector
            .select(&state.live_nodes, self.random.as_ref())
    }

    /// Fetch the current live set and alias map without selecting
    ///
    /// Useful when the caller needs the alias mapping to resolve a collection
    /// name before talking to the endpoint it picked.
    pub async fn cluster_state(&self) -> PickerResult<ClusterState> {
        self.registry.fetch_cluster_state().await
    }
}
