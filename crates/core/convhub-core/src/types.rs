//! Shared data model
//!
//! Wire shapes use camelCase to match the JSON the proxy routes accept.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Connection settings for the external chat-completion provider.
///
/// Held in memory only. Every field must be non-empty before any network
/// operation; a JSON `null` or a missing key deserializes to an empty string
/// so the proxy can answer with its own "missing" error instead of a
/// deserialization rejection.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LlmConfig {
    /// Absolute HTTP(S) URL of the completion endpoint
    #[serde(deserialize_with = "null_as_default")]
    pub base_url: String,

    /// Bearer credential, opaque
    #[serde(deserialize_with = "null_as_default")]
    pub api_key: String,

    /// Model identifier
    #[serde(deserialize_with = "null_as_default")]
    pub model: String,
}

impl LlmConfig {
    /// Create a new configuration
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }

    /// Names of the fields that are empty
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.base_url.is_empty() {
            missing.push("baseUrl");
        }
        if self.api_key.is_empty() {
            missing.push("apiKey");
        }
        if self.model.is_empty() {
            missing.push("model");
        }
        missing
    }

    /// True when all three fields are present
    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }
}

// Keep the key out of logs.
impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("api_key", &if self.api_key.is_empty() { "" } else { "***" })
            .field("model", &self.model)
            .finish()
    }
}

/// Who authored a displayed chat message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// The person using the app
    User,
    /// The provider's reply
    Ai,
}

/// A chat message as displayed in the chat panel
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Author
    pub sender: Sender,
    /// Message body
    pub text: String,
}

impl ChatMessage {
    /// A message typed by the user
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            text: text.into(),
        }
    }

    /// A message produced by the provider (or an inline error)
    pub fn ai(text: impl Into<String>) -> Self {
        Self {
            sender: Sender::Ai,
            text: text.into(),
        }
    }
}

/// Provider-facing role
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// User turn
    User,
    /// Assistant turn
    Assistant,
    /// System instruction
    System,
}

/// A chat message in the shape the provider expects
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProxyMessage {
    /// Role of the author
    pub role: Role,
    /// Message body
    pub content: String,
}

impl ProxyMessage {
    /// A user turn
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

impl From<&ChatMessage> for ProxyMessage {
    fn from(msg: &ChatMessage) -> Self {
        let role = match msg.sender {
            Sender::User => Role::User,
            Sender::Ai => Role::Assistant,
        };
        Self {
            role,
            content: msg.text.clone(),
        }
    }
}

/// Outcome of a configuration test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestResult {
    /// Whether the configuration looks usable
    pub success: bool,
    /// Human-readable explanation
    pub message: String,
}

impl TestResult {
    /// A passing verdict
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    /// A failing verdict
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

/// Body of `POST /api/chat`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    /// Provider settings, flattened into the top-level object
    #[serde(flatten)]
    pub config: LlmConfig,

    /// Conversation so far, oldest first
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ProxyMessage>,
}

/// Body sent to the provider
#[derive(Debug, Serialize)]
pub struct CompletionRequest<'a> {
    /// Model identifier
    pub model: &'a str,
    /// Conversation
    pub messages: &'a [ProxyMessage],
}

/// Failure envelope returned by the proxy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// Always false
    pub success: bool,

    /// Human-readable message
    pub message: String,

    /// Upstream body, when one was received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// Envelope without an upstream body
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: None,
        }
    }

    /// Envelope carrying the upstream body
    pub fn with_error(message: impl Into<String>, error: serde_json::Value) -> Self {
        Self {
            success: false,
            message: message.into(),
            error: Some(error),
        }
    }
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
