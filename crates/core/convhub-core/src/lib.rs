//! convhub core types and ambient services
//!
//! Shared by the proxy server, the API client and the web adaptor:
//!
//! - Data model for provider settings, chat messages and test results
//! - Error type and `Result` alias
//! - Environment loading and typed env helpers
//! - Logging initialization and log redaction
//! - Prompt templates and lenient completion parsing

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod completion;
pub mod config;
pub mod error;
pub mod templates;
pub mod types;
pub mod utils;

pub use completion::{extract_reply, MISSING_MARKDOWN_FALLBACK, MISSING_REPLY_FALLBACK};
pub use config::{get_env_bool, get_env_int, get_env_or, load_env};
pub use error::{ConvHubError, Result};
pub use templates::{compose_conversion_prompt, TemplateEngine};
pub use types::{
    ChatMessage, ChatRequest, CompletionRequest, ErrorEnvelope, LlmConfig, ProxyMessage, Role,
    Sender, TestResult,
};
