//! # Registry Transport Module
//!
//! This module defines the capability interface between the picker and the
//! coordination service. The picker never speaks the registry's wire protocol
//! itself; callers hand it a `RegistryTransport` backed by their registry
//! client of choice, and the picker drives it through the session contract.
//!
//! ## Rust Concepts Used
//!
//! - `async_trait` enables async methods in traits
//! - `Box<dyn Trait>` enables dynamic dispatch for trait objects
//! - `self: Box<Self>` makes `close` consume the session, so a closed session
//!   cannot be used again
//!
//! ## Session Contract
//!
//! One `connect` yields one session. The session serves any number of reads
//! and is then closed exactly once via the consuming `close`. Implementations
//! must treat `close` as infallible; a transport that can fail on close should
//! log and swallow the failure internally.

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;

use crate::core::config::ConnectOptions;
use crate::core::error::PickerResult;

/// Transport capability for reaching a coordination service
///
/// Implementations wrap a concrete registry client (or an in-memory map, see
/// [`StaticRegistry`]). The connect options are passed through unmodified;
/// the transport owns the timeout/retry behavior they describe.
#[async_trait]
pub trait RegistryTransport: Send + Sync {
    /// Establish one session against the registry
    ///
    /// When no session can be established, because the registry is
    /// unreachable or the timeout/retry policy in `options` is exhausted,
    /// implementations return
    /// [`Connection`](crate::core::error::PickerError::Connection) carrying
    /// the connection string and the underlying reason. The client
    /// propagates that error unchanged and never re-wraps it.
    async fn connect(
        &self,
        connection_string: &str,
        options: &ConnectOptions,
    ) -> PickerResult<Box<dyn RegistrySession>>;
}

/// One established registry session
///
/// Reads may run concurrently; both take `&self`. The session ends with the
/// consuming [`close`](RegistrySession::close).
#[async_trait]
pub trait RegistrySession: Send + Sync {
    /// List the child names under a path
    async fn get_children(&self, path: &str) -> PickerResult<Vec<String>>;

    /// Read the data payload stored at a path, `None` if nothing is stored
    async fn get_data(&self, path: &str) -> PickerResult<Option<Vec<u8>>>;

    /// Release the session
    async fn close(self: Box<Self>);
}

/// Shared state behind a [`StaticRegistry`] and its sessions
struct StaticRegistryState {
    children: RwLock<HashMap<String, Vec<String>>>,
    data: RwLock<HashMap<String, Vec<u8>>>,
    sessions_opened: AtomicU64,
    sessions_closed: AtomicU64,
}

/// In-memory registry for testing and simple deployments
///
/// Holds children and data payloads in process-local maps. It also counts the
/// sessions it has opened and closed, which makes the one-session-per-fetch
/// lifecycle observable from tests.
#[derive(Clone)]
pub struct StaticRegistry {
    state: Arc<StaticRegistryState>,
}

impl StaticRegistry {
    pub fn new() -> Self {
        Self {
            state: Arc::new(StaticRegistryState {
                children: RwLock::new(HashMap::new()),
                data: RwLock::new(HashMap::new()),
                sessions_opened: AtomicU64::new(0),
                sessions_closed: AtomicU64::new(0),
            }),
        }
    }

    /// Set the child names recorded under a path
    pub fn set_children(&self, path: &str, children: Vec<String>) {
        self.state.children.write().insert(path.to_string(), children);
    }

    /// Set the data payload stored at a path
    pub fn set_data(&self, path: &str, data: Vec<u8>) {
        self.state.data.write().insert(path.to_string(), data);
    }

    /// Remove the data payload stored at a path
    pub fn clear_data(&self, path: &str) {
        self.state.data.write().remove(path);
    }

    /// Number of sessions handed out so far
    pub fn sessions_opened(&self) -> u64 {
        self.state.sessions_opened.load(Ordering::Relaxed)
    }

    /// Number of sessions closed so far
    pub fn sessions_closed(&self) -> u64 {
        self.state.sessions_closed.load(Ordering::Relaxed)
    }
}

impl Default for StaticRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RegistryTransport for StaticRegistry {
    async fn connect(
        &self,
        connection_string: &str,
        _options: &ConnectOptions,
    ) -> PickerResult<Box<dyn RegistrySession>> {
        self.state.sessions_opened.fetch_add(1, Ordering::Relaxed);

        debug!(
            connection_string = %connection_string,
            "Opened in-memory registry session"
        );

        Ok(Box::new(StaticSession {
            state: Arc::clone(&self.state),
        }))
    }
}

/// Session over a [`StaticRegistry`]'s maps
struct StaticSession {
    state: Arc<StaticRegistryState>,
}

#[async_trait]
impl RegistrySession for StaticSession {
    async fn get_children(&self, path: &str) -> PickerResult<Vec<String>> {
        // A path nobody populated reads as empty, not as an error
        Ok(self
            .state
            .children
            .read()
            .get(path)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_data(&self, path: &str) -> PickerResult<Option<Vec<u8>>> {
        Ok(self.state.data.read().get(path).cloned())
    }

    async fn close(self: Box<Self>) {
        self.state.sessions_closed.fetch_add(1, Ordering::Relaxed);
        debug!("Closed in-memory registry session");
    }
}
