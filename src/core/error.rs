//! # Error Handling Module
//!
//! This module defines the error taxonomy for the cluster picker using the
//! `thiserror` crate. Every failure a pick can hit, from the registry
//! connection down to the final interval lookup, maps to exactly one variant,
//! and each variant carries enough context (path, connection string, offending
//! entry) to diagnose the failure without re-querying the registry.
//!
//! ## Propagation Policy
//!
//! Errors abort the current invocation immediately. No partial results are
//! ever returned: a pick either fully succeeds with one endpoint or fully
//! fails with one of these variants. This layer performs no retries of its
//! own; `is_retryable` only advises callers which failures are transient.

use thiserror::Error;

/// Main result type used throughout the picker
///
/// Type alias that makes error handling more ergonomic: `PickerResult<T>`
/// instead of `Result<T, PickerError>` everywhere.
pub type PickerResult<T> = Result<T, PickerError>;

/// Error types for registry discovery and weighted selection
///
/// Each variant represents a different category of failure. The
/// `#[error("...")]` attribute from `thiserror` implements `Display` with
/// the given message.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PickerError {
    /// Registry unreachable or the connect attempt timed out
    #[error("Registry connection failed for '{connection_string}': {reason}")]
    Connection {
        connection_string: String,
        reason: String,
    },

    /// Registry reachable but reports zero live members under the queried path
    #[error("Found no live nodes under path '{path}' by connecting at '{connection_string}'")]
    EmptyRegistry {
        path: String,
        connection_string: String,
    },

    /// A live-member entry does not match the expected `host:port...` shape
    #[error("Malformed registry entry '{entry}': {reason}")]
    MalformedEntry { entry: String, reason: String },

    /// Alias payload could not be decoded as JSON
    #[error("Failed to decode alias data at '{path}': {reason}")]
    Decode { path: String, reason: String },

    /// An underlying registry read failed; the transport's error is surfaced unchanged
    #[error("Registry transport error: {message}")]
    Transport { message: String },

    /// Invalid configuration, or a weight table inconsistent with the live set
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The selection algorithm reached a state it never should (e.g. no
    /// partition interval contained the drawn sample)
    #[error("Selection error: {message}")]
    Selection { message: String },
}

impl PickerError {
    /// Create a connection error with the registry address it targeted
    pub fn connection<S: Into<String>>(connection_string: S, reason: S) -> Self {
        Self::Connection {
            connection_string: connection_string.into(),
            reason: reason.into(),
        }
    }

    /// Create an empty-registry error carrying the queried path and address
    pub fn empty_registry<S: Into<String>>(path: S, connection_string: S) -> Self {
        Self::EmptyRegistry {
            path: path.into(),
            connection_string: connection_string.into(),
        }
    }

    /// Create a malformed-entry error for one offending registry child
    pub fn malformed_entry<S: Into<String>>(entry: S, reason: S) -> Self {
        Self::MalformedEntry {
            entry: entry.into(),
            reason: reason.into(),
        }
    }

    /// Create a decode error for the alias payload at the given path
    pub fn decode<S: Into<String>>(path: S, reason: S) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a transport error with a custom message
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a configuration error with a custom message
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a selection error with a custom message
    pub fn selection<S: Into<String>>(message: S) -> Self {
        Self::Selection {
            message: message.into(),
        }
    }

    /// Get a short string tag for this error category
    ///
    /// Used as a label value on error counters and in structured log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Connection { .. } => "connection",
            Self::EmptyRegistry { .. } => "empty_registry",
            Self::MalformedEntry { .. } => "malformed_entry",
            Self::Decode { .. } => "decode",
            Self::Transport { .. } => "transport",
            Self::Configuration { .. } => "configuration",
            Self::Selection { .. } => "selection",
        }
    }

    /// Check if this error is transient from the caller's point of view
    ///
    /// The picker itself never retries; this only tells callers whether a
    /// fresh invocation has a chance of succeeding without a config change.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connection { .. } => true,
            Self::EmptyRegistry { .. } => true,
            Self::Transport { .. } => true,
            Self::MalformedEntry { .. } => false,
            Self::Decode { .. } => false,
            Self::Configuration { .. } => false,
            Self::Selection { .. } => false,
        }
    }
}
