//! convhub web UI
//!
//! Serves the four view components (Config Form, Content Input, Chat Panel,
//! Result Preview) as server-rendered HTML and drives them through the
//! application state controller, which talks to the proxy.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod handlers;
pub mod server;
pub mod state;
pub mod views;

pub use handlers::{WebError, NO_CONTENT_MESSAGE};
pub use server::{build_router, WebUiConfig, WebUiServer, DEFAULT_WEB_PORT};
pub use state::WebState;
pub use views::{PageView, PreviewTab, ResultPreview, Views};
