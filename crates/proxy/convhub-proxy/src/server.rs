//! Proxy server implementation
//!
//! Routes:
//! - `GET /` - liveness text
//! - `GET /health` - health check
//! - `POST /api/test-config` - probe a provider configuration
//! - `POST /api/chat` - forward a chat-completion request

use crate::handlers::{chat_handler, health_check, root, test_config_handler};
use crate::state::ServerState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use convhub_core::{get_env_bool, get_env_int, get_env_or, ConvHubError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Proxy server configuration
#[derive(Debug, Clone)]
pub struct ProxyServerConfig {
    /// Server host
    pub host: String,

    /// Server port (0 picks a free port)
    pub port: u16,

    /// Allow cross-origin requests from any origin
    pub enable_cors: bool,

    /// Maximum accepted request body in bytes
    pub body_limit_bytes: usize,
}

impl Default for ProxyServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            enable_cors: true,
            body_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

impl ProxyServerConfig {
    /// Read `HOST`, `PORT`, `CONVHUB_CORS` and `CONVHUB_BODY_LIMIT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: get_env_or("HOST", &defaults.host),
            port: get_env_int("PORT", defaults.port),
            enable_cors: get_env_bool("CONVHUB_CORS", defaults.enable_cors),
            body_limit_bytes: get_env_int("CONVHUB_BODY_LIMIT", defaults.body_limit_bytes),
        }
    }
}

/// Build the Axum router
pub fn build_router(state: ServerState) -> Router {
    let enable_cors = state.config.enable_cors;
    let body_limit = state.config.body_limit_bytes;

    let mut router = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/api/test-config", post(test_config_handler))
        .route("/api/chat", post(chat_handler))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http());

    // Outermost so preflight requests never reach the handlers
    if enable_cors {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        router = router.layer(cors);
    }

    router
}

/// Proxy server service
pub struct ProxyServer {
    config: Arc<ProxyServerConfig>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl ProxyServer {
    /// Create a new proxy server
    pub fn new(config: ProxyServerConfig) -> Self {
        Self {
            config: Arc::new(config),
            local_addr: None,
            shutdown_tx: None,
            handle: None,
        }
    }

    /// Bind and start serving in the background
    pub async fn start(&mut self) -> Result<SocketAddr> {
        if self.is_running() {
            return Err(ConvHubError::config("Server already running"));
        }

        let router = build_router(ServerState::new(self.config.clone()));

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ConvHubError::config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;
        info!("Proxy server is running on http://{}", local_addr);

        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                error!("Server error: {}", e);
            }
        });

        self.shutdown_tx = Some(tx);
        self.handle = Some(handle);
        self.local_addr = Some(local_addr);
        Ok(local_addr)
    }

    /// Stop the server and wait for in-flight requests to finish
    pub async fn stop(&mut self) -> Result<()> {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            if let Err(e) = handle.await {
                error!("Server task ended abnormally: {}", e);
            }
            info!("Proxy server stopped");
        }
        self.local_addr = None;
        Ok(())
    }

    /// Check if server is running
    pub fn is_running(&self) -> bool {
        self.handle.is_some()
    }

    /// Address the server is bound to, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}
