//! Outbound calls to the chat-completion provider
//!
//! Two operations live here: the configuration probe behind
//! `POST /api/test-config` and the forwarder behind `POST /api/chat`.
//! Neither retries, caches, or rewrites anything beyond the model,
//! messages and bearer header.

use axum::body::Bytes;
use axum::http::StatusCode;
use convhub_core::{CompletionRequest, LlmConfig, ProxyMessage, TestResult};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::debug;

/// Config test verdict when the provider rejects the credentials
pub const AUTH_FAILED_MESSAGE: &str = "Authentication failed. Check your API Key.";

/// Config test verdict when the provider rejects the empty payload
pub const VALIDATION_REACHED_MESSAGE: &str =
    "Configuration is valid. The server was reached successfully.";

/// Config test verdict when the provider accepts the empty payload
pub const RESPONDED_MESSAGE: &str = "Configuration seems valid. The server responded.";

/// Config test verdict when nothing answered
pub const UNREACHABLE_MESSAGE: &str =
    "The request timed out or the server is unreachable. Check Base URL.";

/// Failure to obtain any HTTP response from the provider
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The request went out but no response came back
    #[error("No response from provider: {0}")]
    Unreachable(String),

    /// The request could not be built (bad URL, bad header, ...)
    #[error("{0}")]
    Internal(String),
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_builder() {
            UpstreamError::Internal(e.to_string())
        } else {
            UpstreamError::Unreachable(e.to_string())
        }
    }
}

/// Result of forwarding a chat request
#[derive(Debug)]
pub enum ChatReply {
    /// 2xx from the provider; body relayed verbatim
    Relayed {
        /// Provider's `Content-Type`, if it sent one
        content_type: Option<String>,
        /// Raw body
        body: Bytes,
    },

    /// Non-2xx from the provider
    Rejected {
        /// Provider status, passed through
        status: StatusCode,
        /// Provider body as JSON (a JSON string when it was not JSON, null when empty)
        body: Value,
    },
}

/// Thin wrapper over a shared `reqwest::Client`
#[derive(Clone, Default)]
pub struct ProviderClient {
    http: Client,
}

impl ProviderClient {
    /// Create a client with reqwest's default settings
    pub fn new() -> Self {
        Self {
            http: Client::new(),
        }
    }

    /// Wrap an existing client
    pub fn with_client(http: Client) -> Self {
        Self { http }
    }

    /// Probe the provider with an empty JSON body.
    ///
    /// Best-effort heuristic: it assumes the provider checks credentials
    /// before it validates the payload, so a 400/422 on `{}` means both the
    /// URL and the key were accepted. Providers that validate first will
    /// report success for a bad key.
    pub async fn test_config(&self, config: &LlmConfig) -> Result<TestResult, UpstreamError> {
        let url = parse_url(&config.base_url)?;
        debug!("probing provider at {}", url);

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", config.api_key))
            .header(CONTENT_TYPE, "application/json")
            .body("{}")
            .send()
            .await?;

        Ok(classify_probe_status(response.status().as_u16()))
    }

    /// Forward `{model, messages}` to the provider
    pub async fn forward_chat(
        &self,
        config: &LlmConfig,
        messages: &[ProxyMessage],
    ) -> Result<ChatReply, UpstreamError> {
        let url = parse_url(&config.base_url)?;
        let payload = CompletionRequest {
            model: &config.model,
            messages,
        };

        let response = self
            .http
            .post(url)
            .header(AUTHORIZATION, format!("Bearer {}", config.api_key))
            .json(&payload)
            .send()
            .await?;

        let status =
            StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await?;

        if status.is_success() {
            Ok(ChatReply::Relayed { content_type, body })
        } else {
            Ok(ChatReply::Rejected {
                status,
                body: body_as_json(&body),
            })
        }
    }
}

/// Map the provider's answer to `{}` onto a verdict
pub fn classify_probe_status(status: u16) -> TestResult {
    match status {
        401 | 403 => TestResult::failed(AUTH_FAILED_MESSAGE),
        400 | 422 => TestResult::ok(VALIDATION_REACHED_MESSAGE),
        200..=299 => TestResult::ok(RESPONDED_MESSAGE),
        other => TestResult::failed(format!(
            "Server responded with status {}. Check Base URL.",
            other
        )),
    }
}

fn parse_url(raw: &str) -> Result<Url, UpstreamError> {
    let url = Url::parse(raw.trim()).map_err(|e| UpstreamError::Internal(e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(UpstreamError::Internal(format!(
            "Unsupported URL scheme '{}'",
            other
        ))),
    }
}

fn body_as_json(body: &[u8]) -> Value {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(body)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(body).into_owned()))
}
