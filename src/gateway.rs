//! Connection registry: one cached RPC handle per endpoint plus the active
//! network selection.

use crate::config::consts::{DEVNET_RPC_URL, LOCAL_RPC_URL};
use crate::rpc::SuiRpcClient;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

/// Named networks with a fixed RPC URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Gateway {
    Local,
    Devnet,
}

impl Gateway {
    pub const ALL: [Gateway; 2] = [Gateway::Local, Gateway::Devnet];

    pub fn name(self) -> &'static str {
        match self {
            Gateway::Local => "Local",
            Gateway::Devnet => "Devnet",
        }
    }

    pub fn url(self) -> &'static str {
        match self {
            Gateway::Local => LOCAL_RPC_URL,
            Gateway::Devnet => DEVNET_RPC_URL,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.name() == name)
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Map a network name through the table; anything else is used as a URL.
pub fn resolve_url(endpoint: &str) -> String {
    match Gateway::from_name(endpoint) {
        Some(gateway) => gateway.url().to_string(),
        None => endpoint.to_string(),
    }
}

/// Builds a handle for a URL. Must not perform I/O.
pub trait Connect {
    fn connect(url: &str) -> Self;
}

/// Session context holding every connection made so far and the active one.
///
/// Handles are keyed by the endpoint string the caller passed in (a name or a
/// URL), created on first use and kept for the life of the registry.
pub struct ConnectionRegistry<C = SuiRpcClient> {
    connections: HashMap<String, Arc<C>>,
    active: watch::Sender<Option<String>>,
}

impl<C: Connect> ConnectionRegistry<C> {
    pub fn new() -> Self {
        let (active, _) = watch::channel(None);
        Self {
            connections: HashMap::new(),
            active,
        }
    }

    /// Cached handle for `endpoint`, creating it on first use.
    pub fn resolve(&mut self, endpoint: &str) -> Arc<C> {
        if let Some(handle) = self.connections.get(endpoint) {
            return Arc::clone(handle);
        }
        let url = resolve_url(endpoint);
        debug!(endpoint, url = %url, "creating connection");
        let handle = Arc::new(C::connect(&url));
        self.connections
            .insert(endpoint.to_string(), Arc::clone(&handle));
        handle
    }

    /// Cache a prebuilt handle under `endpoint` unless one already exists.
    /// Returns the handle now cached for the key.
    #[cfg(test)]
    pub(crate) fn register(&mut self, endpoint: &str, handle: Arc<C>) -> Arc<C> {
        Arc::clone(
            self.connections
                .entry(endpoint.to_string())
                .or_insert(handle),
        )
    }

    /// Make `endpoint` the network every later operation uses.
    pub fn set_active(&mut self, endpoint: &str) -> Arc<C> {
        let handle = self.resolve(endpoint);
        self.active.send_replace(Some(endpoint.to_string()));
        info!(endpoint, url = %resolve_url(endpoint), "active network changed");
        handle
    }

    /// Handle for the active network, if one was ever selected.
    pub fn active(&self) -> Option<Arc<C>> {
        let active = self.active.borrow();
        active
            .as_deref()
            .and_then(|endpoint| self.connections.get(endpoint))
            .cloned()
    }

    pub fn active_endpoint(&self) -> Option<String> {
        self.active.borrow().clone()
    }

    /// Watch the active endpoint. The receiver sees every later `set_active`.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.active.subscribe()
    }

    /// Endpoint keys with a live handle.
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.connections.keys().map(String::as_str)
    }
}

impl<C: Connect> Default for ConnectionRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}
