//! Web UI server
//!
//! Routes:
//! - `GET /` - the page
//! - `POST /config/save`, `POST /config/test` - Config Form
//! - `POST /content`, `POST /content/upload`, `POST /convert` - Content Input
//! - `POST /chat`, `POST /chat/clear` - Chat Panel
//! - `POST /preview/tab`, `GET /download/markdown`, `GET /download/mindmap` - Result Preview
//! - `GET /health` - health check

use crate::handlers::{
    chat, clear_chat, convert, download_markdown, download_mind_map, edit_config, health_check,
    index, preview_tab, save_config, set_content, test_config, upload,
};
use crate::state::WebState;
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use convhub_client::{ApiClient, AppController, ChatBackend, DEFAULT_PROXY_URL};
use convhub_core::{get_env_int, get_env_or, ConvHubError, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{error, info};

/// Default listen port
pub const DEFAULT_WEB_PORT: u16 = 3000;

/// Web UI server configuration
#[derive(Debug, Clone)]
pub struct WebUiConfig {
    /// Server host
    pub host: String,

    /// Server port (0 picks a free port)
    pub port: u16,

    /// Root of the proxy's `/api` routes
    pub proxy_url: String,

    /// Seconds a config-test verdict stays visible
    pub banner_secs: u64,

    /// Maximum upload size in bytes
    pub upload_limit_bytes: usize,
}

impl Default for WebUiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_WEB_PORT,
            proxy_url: DEFAULT_PROXY_URL.to_string(),
            banner_secs: 6,
            upload_limit_bytes: 10 * 1024 * 1024,
        }
    }
}

impl WebUiConfig {
    /// Read `WEB_HOST`, `WEB_PORT`, `CONVHUB_PROXY_URL`, `CONVHUB_BANNER_SECS`
    /// and `CONVHUB_BODY_LIMIT`
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: get_env_or("WEB_HOST", &defaults.host),
            port: get_env_int("WEB_PORT", defaults.port),
            proxy_url: get_env_or("CONVHUB_PROXY_URL", &defaults.proxy_url),
            banner_secs: get_env_int("CONVHUB_BANNER_SECS", defaults.banner_secs),
            upload_limit_bytes: get_env_int("CONVHUB_BODY_LIMIT", defaults.upload_limit_bytes),
        }
    }

    /// Banner lifetime
    pub fn banner_ttl(&self) -> Duration {
        Duration::from_secs(self.banner_secs)
    }
}

/// Build the Axum router
pub fn build_router<B: ChatBackend + 'static>(state: WebState<B>) -> Router {
    let upload_limit = state.config.upload_limit_bytes;

    Router::new()
        .route("/", get(index::<B>))
        .route("/health", get(health_check))
        .route("/config/save", post(save_config::<B>))
        .route("/config/draft", post(edit_config::<B>))
        .route("/config/test", post(test_config::<B>))
        .route("/content", post(set_content::<B>))
        .route("/content/upload", post(upload::<B>))
        .route("/convert", post(convert::<B>))
        .route("/chat", post(chat::<B>))
        .route("/chat/clear", post(clear_chat::<B>))
        .route("/preview/tab", post(preview_tab::<B>))
        .route("/download/markdown", get(download_markdown::<B>))
        .route("/download/mindmap", get(download_mind_map::<B>))
        .with_state(state)
        .layer(DefaultBodyLimit::max(upload_limit))
        .layer(TraceLayer::new_for_http())
}

/// Web UI server backed by the proxy at `config.proxy_url`
pub struct WebUiServer {
    config: Arc<WebUiConfig>,
    local_addr: Option<SocketAddr>,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl WebUiServer {
    /// Create a new web UI server
    pub fn new(config: WebUiConfig) -> Self {
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

        let controller = AppController::with_banner_ttl(
            ApiClient::new(self.config.proxy_url.clone()),
            self.config.banner_ttl(),
        );
        let router = build_router(WebState::new(controller, self.config.clone())?);

        let addr = format!("{}:{}", self.config.host, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| ConvHubError::config(format!("Failed to bind to {}: {}", addr, e)))?;
        let local_addr = listener.local_addr()?;
        info!(
            "Web UI is running on http://{} (proxy: {})",
            local_addr, self.config.proxy_url
        );

        let (tx, rx) = tokio::sync::oneshot::channel();
        let handle = tokio::spawn(async move {
            let server = axum::serve(listener, router).with_graceful_shutdown(async {
                let _ = rx.await;
            });
            if let Err(e) = server.await {
                error!("Web UI server error: {}", e);
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
                error!("Web UI task ended abnormally: {}", e);
            }
            info!("Web UI stopped");
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
