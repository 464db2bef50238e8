//! # Cluster Picker - Core Library Crate
//!
//! Weighted random selection of one live backend from a dynamic cluster
//! registry. The registry (an external coordination service) holds the
//! ephemeral list of currently-live server addresses plus an optional alias
//! map; this crate fetches that state over a caller-supplied transport and
//! picks one address per call, with probability proportional to each
//! address's configured weight.
//!
//! ## How a Pick Works
//!
//! 1. Open one registry session and read the live-node children and alias
//!    data concurrently
//! 2. Normalize each raw entry into an addressable `host:port/path` endpoint
//! 3. Partition [0, 1) across the live endpoints proportionally to their
//!    weights, draw one uniform sample, and return the matching endpoint
//!
//! No state survives between picks: liveness always comes from the registry,
//! and the session is closed before the pick resolves, success or failure.

// Core modules - order matters for dependency resolution in Rust

/// Core functionality including error types, configuration, and basic data structures
/// This module contains the fundamental building blocks used throughout the picker
pub mod core;

/// Registry access: the transport capability interface, the in-memory
/// registry, and the client that fetches one consistent cluster snapshot
pub mod registry;

/// Weighted selection: unit-interval partitioning and the selector that maps
/// one uniform draw to a live endpoint
pub mod selection;

/// Top-level composition: fetch cluster state, then select one endpoint
pub mod picker;

// Re-export commonly used types for easier access

/// Main error type and result alias used throughout the picker
pub use crate::core::error::{PickerError, PickerResult};

/// Main configuration structures
/// Re-exported because they are needed by anyone using this library
pub use crate::core::config::{ConnectOptions, PickerConfig, RegistryConfig};

/// Common data model types
pub use crate::core::types::{AliasMap, ClusterState, Endpoint, WeightTable};

/// Registry capability surface and the in-memory implementation
pub use crate::registry::{RegistryClient, RegistrySession, RegistryTransport, StaticRegistry};

/// Selection primitives, including the injectable random source
pub use crate::selection::{RandomSource, ThreadRngSource, WeightedSelector};

/// The primary entry point for using this library
pub use crate::picker::ClusterPicker;
