//! # Core Types Module
//!
//! This module defines the foundational data structures shared by the registry
//! client and the weighted selector. They are deliberately small value types:
//! a pick is a short-lived operation, so everything here is cheap to clone and
//! carries no connection state.
//!
//! ## Design Notes
//!
//! - `Endpoint` always holds the *normalized* form (`host:port/collection/...`),
//!   never the raw registry entry (`host:port_collection_...`).
//! - `AliasMap` is inverted relative to the registry payload: it maps an alias
//!   to its canonical collection, which is the direction lookups need.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// A selectable cluster node address in normalized `host:port/path` form.
///
/// Endpoints are produced by the registry client from raw live-node entries
/// and consumed by the weighted selector and by weight tables as lookup keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Endpoint(String);

impl Endpoint {
    /// Create an endpoint from an already-normalized address
    pub fn new<S: Into<String>>(address: S) -> Self {
        Self(address.into())
    }

    /// Get the endpoint address as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Endpoint {
    fn from(address: &str) -> Self {
        Self(address.to_string())
    }
}

impl From<String> for Endpoint {
    fn from(address: String) -> Self {
        Self(address)
    }
}

impl AsRef<str> for Endpoint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Relative selection weights keyed by endpoint.
///
/// A weight expresses how much of the selection range an endpoint should
/// receive relative to the other live endpoints. Endpoints missing from the
/// table are still selectable members of the cluster; they simply receive a
/// zero-width share and are never chosen.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightTable(HashMap<Endpoint, f64>);

impl WeightTable {
    /// Create an empty weight table
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Set the weight for an endpoint, replacing any previous value
    pub fn insert<E: Into<Endpoint>>(&mut self, endpoint: E, weight: f64) {
        self.0.insert(endpoint.into(), weight);
    }

    /// Look up the weight for an endpoint, if one was configured
    pub fn weight_of(&self, endpoint: &Endpoint) -> Option<f64> {
        self.0.get(endpoint).copied()
    }

    /// Number of configured weights
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Collect the configured weights that are not positive, finite numbers.
    ///
    /// Returns an empty vector when every weight is usable. The caller decides
    /// whether a bad weight is fatal; configuration validation treats it as an
    /// error before any registry traffic happens.
    pub fn invalid_weights(&self) -> Vec<(Endpoint, f64)> {
        let mut invalid: Vec<(Endpoint, f64)> = self
            .0
            .iter()
            .filter(|(_, weight)| !weight.is_finite() || **weight <= 0.0)
            .map(|(endpoint, weight)| (endpoint.clone(), *weight))
            .collect();
        invalid.sort_by(|a, b| a.0.as_str().cmp(b.0.as_str()));
        invalid
    }
}

impl FromIterator<(Endpoint, f64)> for WeightTable {
    fn from_iter<I: IntoIterator<Item = (Endpoint, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Alias-to-canonical collection mapping read from the registry.
///
/// The registry stores aliases grouped by canonical collection; this type
/// holds the inverted view so `resolve("books-alias")` answers directly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AliasMap(HashMap<String, String>);

impl AliasMap {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Record that `alias` points at `canonical`
    pub fn insert<A: Into<String>, C: Into<String>>(&mut self, alias: A, canonical: C) {
        self.0.insert(alias.into(), canonical.into());
    }

    /// Resolve an alias to its canonical collection name
    pub fn resolve(&self, alias: &str) -> Option<&str> {
        self.0.get(alias).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One consistent snapshot of the registry, taken over a single session.
///
/// Both fields come from the same connection: the live nodes from the
/// live-nodes path and the aliases from the alias path. `aliases` is `None`
/// when the registry payload had no alias section at all, and `Some` with an
/// empty map when the section existed but was empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterState {
    /// Normalized live endpoints, in registry order
    pub live_nodes: Vec<Endpoint>,
    /// Inverted alias mapping, if the registry published one
    pub aliases: Option<AliasMap>,
}

impl ClusterState {
    pub fn new(live_nodes: Vec<Endpoint>, aliases: Option<AliasMap>) -> Self {
        Self {
            live_nodes,
            aliases,
        }
    }

    /// Number of live endpoints in this snapshot
    pub fn node_count(&self) -> usize {
        self.live_nodes.len()
    }
}
