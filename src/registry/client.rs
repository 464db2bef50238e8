//! # Registry Client Module
//!
//! This module fetches one consistent snapshot of the cluster from the
//! coordination service: the live-node list and the optional alias map. Each
//! fetch opens its own session through the transport, runs both reads
//! concurrently on it, and releases the session exactly once whatever the
//! outcome. Nothing is cached between fetches; the registry is the only
//! source of truth for liveness.

use metrics::counter;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::config::RegistryConfig;
use crate::core::error::{PickerError, PickerResult};
use crate::core::types::{AliasMap, ClusterState, Endpoint};
use crate::registry::transport::{RegistrySession, RegistryTransport};

/// Raw alias payload as the registry stores it: canonical collection name to
/// the list of aliases pointing at it
#[derive(Debug, Deserialize)]
struct AliasPayload {
    collection: Option<HashMap<String, Vec<String>>>,
}

/// Client for one-shot cluster state retrieval
///
/// Holds the registry settings and the transport; every call to
/// [`fetch_cluster_state`](RegistryClient::fetch_cluster_state) is an
/// independent connect/read/close cycle.
pub struct RegistryClient {
    config: RegistryConfig,
    transport: Arc<dyn RegistryTransport>,
    port_pattern: Regex,
}

impl RegistryClient {
    /// Create a client over the given transport
    pub fn new(config: RegistryConfig, transport: Arc<dyn RegistryTransport>) -> PickerResult<Self> {
        let port_pattern = Regex::new(r":\d+").map_err(|e| {
            PickerError::config(format!("Failed to compile port pattern: {}", e))
        })?;

        Ok(Self {
            config,
            transport,
            port_pattern,
        })
    }

    /// Fetch the live-node list and alias map over a single session
    ///
    /// The two reads run concurrently once the session is up. The session is
    /// closed exactly once before any error from the reads propagates.
    pub async fn fetch_cluster_state(&self) -> PickerResult<ClusterState> {
        debug!(
            connection_string = %self.config.connection_string,
            live_nodes_path = %self.config.live_nodes_path,
            "Fetching cluster state from registry"
        );
        counter!("picker_registry_fetches").increment(1);

        let session = self
            .transport
            .connect(&self.config.connection_string, &self.config.connect)
            .await?;

        let outcome = tokio::try_join!(
            self.read_live_nodes(session.as_ref()),
            self.read_aliases(session.as_ref())
        );

        // Close before propagating so a failed read never leaks the session
        session.close().await;

        match outcome {
            Ok((live_nodes, aliases)) => {
                debug!(
                    live_nodes = live_nodes.len(),
                    aliases = aliases.as_ref().map(|a| a.len()).unwrap_or(0),
                    "Fetched cluster state"
                );
                Ok(ClusterState::new(live_nodes, aliases))
            }
            Err(e) => {
                counter!("picker_registry_fetch_failures").increment(1);
                warn!(
                    error = %e,
                    error_kind = e.kind(),
                    retryable = e.is_retryable(),
                    "Cluster state fetch failed"
                );
                Err(e)
            }
        }
    }

    /// Read and normalize the live-node children
    async fn read_live_nodes(&self, session: &dyn RegistrySession) -> PickerResult<Vec<Endpoint>> {
        let children = session.get_children(&self.config.live_nodes_path).await?;

        if children.is_empty() {
            return Err(PickerError::empty_registry(
                self.config.live_nodes_path.as_str(),
                self.config.connection_string.as_str(),
            ));
        }

        children
            .iter()
            .map(|entry| self.normalize_entry(entry))
            .collect()
    }

    /// Read the alias payload, if an alias path is configured at all
    async fn read_aliases(&self, session: &dyn RegistrySession) -> PickerResult<Option<AliasMap>> {
        let aliases_path = match &self.config.aliases_path {
            Some(path) => path,
            None => return Ok(None),
        };

        let payload = session.get_data(aliases_path).await?;
        decode_aliases(aliases_path, payload.as_deref())
    }

    /// Turn a raw registry entry into an addressable endpoint
    ///
    /// The first `:digits` run ends the host:port part; every `_` after it
    /// becomes a `/`. `10.0.0.5:8983_solr_eu` becomes `10.0.0.5:8983/solr/eu`.
    fn normalize_entry(&self, entry: &str) -> PickerResult<Endpoint> {
        let port_match = self
            .port_pattern
            .find(entry)
            .ok_or_else(|| PickerError::malformed_entry(entry, "missing ':port' segment"))?;

        let (address, remainder) = entry.split_at(port_match.end());
        Ok(Endpoint::new(format!(
            "{}{}",
            address,
            remainder.replace('_', "/")
        )))
    }
}

/// Decode the raw alias payload and invert it to alias -> canonical
///
/// A missing or empty payload reads as an empty object, and an object without
/// a `collection` field means the registry publishes no aliases.
fn decode_aliases(path: &str, payload: Option<&[u8]>) -> PickerResult<Option<AliasMap>> {
    let bytes = match payload {
        Some(bytes) if !bytes.is_empty() => bytes,
        _ => return Ok(None),
    };

    let decoded: AliasPayload = serde_json::from_slice(bytes)
        .map_err(|e| PickerError::decode(path.to_string(), e.to_string()))?;

    let collections = match decoded.collection {
        Some(collections) => collections,
        None => return Ok(None),
    };

    let mut aliases = AliasMap::new();
    for (canonical, names) in collections {
        for alias in names {
            aliases.insert(alias, canonical.clone());
        }
    }
    Ok(Some(aliases))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::ConnectOptions;
    use crate::registry::transport::StaticRegistry;

    fn test_config() -> RegistryConfig {
        RegistryConfig {
            connection_string: "zk1:2181,zk2:2181".to_string(),
            live_nodes_path: "/live_nodes".to_string(),
            aliases_path: Some("/aliases.json".to_string()),
            connect: ConnectOptions::default(),
        }
    }

    fn test_client(registry: &StaticRegistry) -> RegistryClient {
        RegistryClient::new(test_config(), Arc::new(registry.clone())).unwrap()
    }

    #[test]
    fn test_normalize_entry_replaces_underscores_after_port() {
        let client = test_client(&StaticRegistry::new());

        let endpoint = client.normalize_entry("10.0.0.5:8983_solr_eu").unwrap();
        assert_eq!(endpoint.as_str(), "10.0.0.5:8983/solr/eu");

        let endpoint = client.normalize_entry("10.0.0.5:8983_solr/eu").unwrap();
        assert_eq!(endpoint.as_str(), "10.0.0.5:8983/solr/eu");
    }

    #[test]
    fn test_normalize_entry_without_subpath() {
        let client = test_client(&StaticRegistry::new());
        let endpoint = client.normalize_entry("10.0.0.5:8983").unwrap();
        assert_eq!(endpoint.as_str(), "10.0.0.5:8983");
    }

    #[test]
    fn test_normalize_entry_rejects_missing_port() {
        let client = test_client(&StaticRegistry::new());
        let result = client.normalize_entry("not-an-entry");

        match result {
            Err(PickerError::MalformedEntry { entry, .. }) => {
                assert_eq!(entry, "not-an-entry");
            }
            other => panic!("expected MalformedEntry, got {:?}", other),
        }
    }

    #[test]
    fn test_decode_aliases_handles_missing_and_empty_payloads() {
        assert_eq!(decode_aliases("/aliases.json", None).unwrap(), None);
        assert_eq!(
            decode_aliases("/aliases.json", Some(b"".as_slice())).unwrap(),
            None
        );
        assert_eq!(
            decode_aliases("/aliases.json", Some(b"{}".as_slice())).unwrap(),
            None
        );
    }

    #[test]
    fn test_decode_aliases_inverts_collection_map() {
        let payload = br#"{"collection": {"catalog": ["catalog-alias1", "catalog-alias2"]}}"#;
        let aliases = decode_aliases("/aliases.json", Some(payload.as_slice()))
            .unwrap()
            .unwrap();

        assert_eq!(aliases.resolve("catalog-alias1"), Some("catalog"));
        assert_eq!(aliases.resolve("catalog-alias2"), Some("catalog"));
        assert_eq!(aliases.len(), 2);
    }

    #[test]
    fn test_decode_aliases_empty_collection_section() {
        let aliases =
            decode_aliases("/aliases.json", Some(br#"{"collection": {}}"#.as_slice())).unwrap();
        assert_eq!(aliases, Some(AliasMap::new()));
    }

    #[test]
    fn test_decode_aliases_rejects_malformed_json() {
        let result = decode_aliases("/aliases.json", Some(b"not json".as_slice()));

        match result {
            Err(PickerError::Decode { path, .. }) => assert_eq!(path, "/aliases.json"),
            other => panic!("expected Decode, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_fetch_cluster_state_happy_path() {
        let registry = StaticRegistry::new();
        registry.set_children(
            "/live_nodes",
            vec![
                "10.0.0.5:8983_solr".to_string(),
                "10.0.0.6:8983_solr".to_string(),
            ],
        );
        registry.set_data(
            "/aliases.json",
            br#"{"collection": {"books": ["books-alias"]}}"#.to_vec(),
        );

        let client = test_client(&registry);
        let state = client.fetch_cluster_state().await.unwrap();

        assert_eq!(
            state.live_nodes,
            vec![
                Endpoint::new("10.0.0.5:8983/solr"),
                Endpoint::new("10.0.0.6:8983/solr"),
            ]
        );
        let aliases = state.aliases.unwrap();
        assert_eq!(aliases.resolve("books-alias"), Some("books"));

        assert_eq!(registry.sessions_opened(), 1);
        assert_eq!(registry.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_fetch_cluster_state_empty_registry() {
        let registry = StaticRegistry::new();
        let client = test_client(&registry);

        let result = client.fetch_cluster_state().await;

        match result {
            Err(PickerError::EmptyRegistry {
                path,
                connection_string,
            }) => {
                assert_eq!(path, "/live_nodes");
                assert_eq!(connection_string, "zk1:2181,zk2:2181");
            }
            other => panic!("expected EmptyRegistry, got {:?}", other),
        }

        // The session is still released on the failure path
        assert_eq!(registry.sessions_opened(), 1);
        assert_eq!(registry.sessions_closed(), 1);
    }

    #[tokio::test]
    async fn test_fetch_skips_aliases_when_not_configured() {
        let registry = StaticRegistry::new();
        registry.set_children("/live_nodes", vec!["10.0.0.5:8983_solr".to_string()]);

        let mut config = test_config();
        config.aliases_path = None;
        let client = RegistryClient::new(config, Arc::new(registry.clone())).unwrap();

        let state = client.fetch_cluster_state().await.unwrap();
        assert!(state.aliases.is_none());
        assert_eq!(state.node_count(), 1);
    }

    #[tokio::test]
    async fn test_fetch_without_alias_payload() {
        let registry = StaticRegistry::new();
        registry.set_children("/live_nodes", vec!["10.0.0.5:8983_solr".to_string()]);

        let client = test_client(&registry);
        let state = client.fetch_cluster_state().await.unwrap();

        assert!(state.aliases.is_none());
    }

    #[tokio::test]
    async fn test_fetch_aborts_on_malformed_entry() {
        let registry = StaticRegistry::new();
        registry.set_children(
            "/live_nodes",
            vec!["10.0.0.5:8983_solr".to_string(), "garbage".to_string()],
        );

        let client = test_client(&registry);
        let result = client.fetch_cluster_state().await;

        assert!(matches!(result, Err(PickerError::MalformedEntry { .. })));
        assert_eq!(registry.sessions_closed(), 1);
    }
}
