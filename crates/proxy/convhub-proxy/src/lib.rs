//! Stateless proxy between the convhub frontend and a chat-completion provider
//!
//! The caller supplies the provider URL and bearer credential on every
//! request; nothing is stored server-side.
//!
//! # Endpoints
//!
//! - `POST /api/test-config` - `{baseUrl, apiKey, model}` → `{success, message}`
//! - `POST /api/chat` - `{baseUrl, apiKey, model, messages}` → provider body
//!
//! # Example
//!
//! ```no_run
//! use convhub_proxy::{ProxyServer, ProxyServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> convhub_core::Result<()> {
//!     let mut server = ProxyServer::new(ProxyServerConfig::default());
//!     server.start().await?;
//!     tokio::signal::ctrl_c().await?;
//!     server.stop().await
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod handlers;
pub mod provider;
pub mod server;
pub mod state;

pub use handlers::ApiError;
pub use provider::{classify_probe_status, ChatReply, ProviderClient, UpstreamError};
pub use server::{build_router, ProxyServer, ProxyServerConfig, DEFAULT_PORT};
pub use state::ServerState;
