//! convhub client side
//!
//! Everything the UI needs apart from the views themselves:
//!
//! - [`api::ApiClient`]: HTTP client for the proxy's `/api` routes
//! - [`controller::AppController`]: application state and the test,
//!   convert and chat flows
//! - [`documents`]: text extraction from uploaded files
//! - [`render`]: Markdown to HTML and Markdown to mind map
//! - [`artifacts`]: downloadable `.md` and `.svg` files
//!
//! # Example
//!
//! ```no_run
//! use convhub_client::{ApiClient, AppController};
//! use convhub_core::LlmConfig;
//!
//! # async fn run() {
//! let controller = AppController::new(ApiClient::default());
//! controller.save_config(LlmConfig::new(
//!     "https://api.openai.com/v1/chat/completions",
//!     "sk-...",
//!     "gpt-4o-mini",
//! ));
//! controller.set_content("meeting notes ...");
//! controller.convert().await;
//! println!("{}", controller.snapshot().converted_markdown);
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod api;
pub mod artifacts;
pub mod controller;
pub mod documents;
pub mod render;

pub use api::{ApiClient, ChatBackend, DEFAULT_PROXY_URL, UNKNOWN_ERROR_MESSAGE};
pub use artifacts::Artifact;
pub use controller::{AppController, AppState, Notification, Severity, TestBanner};
pub use documents::{DocumentExtractor, DocumentKind, RawTextExtractor, READ_FAILED_MESSAGE};
pub use render::{GfmRenderer, MarkdownRenderer, MindMap, MindMapNode};
