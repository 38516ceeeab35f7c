//! Shared state for proxy handlers
//!
//! Nothing mutable lives here: requests share only the outbound client.

use crate::provider::ProviderClient;
use crate::server::ProxyServerConfig;
use std::sync::Arc;

/// State cloned into every handler
#[derive(Clone)]
pub struct ServerState {
    /// Outbound client (pooled connections)
    pub provider: ProviderClient,

    /// Configuration
    pub config: Arc<ProxyServerConfig>,
}

impl ServerState {
    /// Create new server state
    pub fn new(config: Arc<ProxyServerConfig>) -> Self {
        Self {
            provider: ProviderClient::new(),
            config,
        }
    }
}
