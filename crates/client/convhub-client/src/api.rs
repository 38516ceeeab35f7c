//! HTTP client for the proxy's `/api` routes

use async_trait::async_trait;
use convhub_core::{ChatRequest, ConvHubError, LlmConfig, ProxyMessage, Result, TestResult};
use reqwest::{Client, Response};
use serde_json::Value;
use tracing::{debug, warn};

/// Proxy location used when none is configured
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3001/api";

/// Shown when the proxy gave no usable explanation
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// What the controller needs from the proxy.
///
/// Split out so the controller can be driven by a mock.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// Ask the proxy to probe `config`. Never fails; failures become a
    /// `TestResult` with `success == false`.
    async fn test_config(&self, config: &LlmConfig) -> TestResult;

    /// Send a chat request and return the provider's response body
    async fn chat(&self, config: &LlmConfig, messages: &[ProxyMessage]) -> Result<Value>;
}

/// Client for the proxy
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    http: Client,
}

impl ApiClient {
    /// Create a client rooted at `base_url` (e.g. `http://localhost:3001/api`)
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a client reusing an existing `reqwest::Client`
    pub fn with_client(base_url: impl Into<String>, http: Client) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, http }
    }

    /// Proxy root this client talks to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }

    /// `POST {base}/test-config`
    pub async fn test_config(&self, config: &LlmConfig) -> TestResult {
        let response = match self
            .http
            .post(self.endpoint("test-config"))
            .json(config)
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!("test-config request failed: {}", e);
                return TestResult::failed(UNKNOWN_ERROR_MESSAGE);
            }
        };

        let status = response.status();
        let body = read_json(response).await;
        if !status.is_success() {
            debug!("test-config answered {}", status);
            return TestResult::failed(
                server_message(&body).unwrap_or_else(|| UNKNOWN_ERROR_MESSAGE.to_string()),
            );
        }

        match serde_json::from_value::<TestResult>(body) {
            Ok(result) => result,
            Err(e) => {
                warn!("test-config returned an unexpected body: {}", e);
                TestResult::failed(UNKNOWN_ERROR_MESSAGE)
            }
        }
    }

    /// `POST {base}/chat`, returning the provider's body on success
    pub async fn send_chat(&self, config: &LlmConfig, messages: &[ProxyMessage]) -> Result<Value> {
        let request = ChatRequest {
            config: config.clone(),
            messages: messages.to_vec(),
        };

        let response = self
            .http
            .post(self.endpoint("chat"))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<Value>().await?);
        }

        let body = read_json(response).await;
        let message = server_message(&body)
            .unwrap_or_else(|| format!("Request failed with status {}", status.as_u16()));
        Err(ConvHubError::api(status.as_u16(), message))
    }
}

impl Default for ApiClient {
    fn default() -> Self {
        Self::new(DEFAULT_PROXY_URL)
    }
}

#[async_trait]
impl ChatBackend for ApiClient {
    async fn test_config(&self, config: &LlmConfig) -> TestResult {
        ApiClient::test_config(self, config).await
    }

    async fn chat(&self, config: &LlmConfig, messages: &[ProxyMessage]) -> Result<Value> {
        self.send_chat(config, messages).await
    }
}

async fn read_json(response: Response) -> Value {
    match response.bytes().await {
        Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or(Value::Null),
        Err(_) => Value::Null,
    }
}

fn server_message(body: &Value) -> Option<String> {
    body.get("message")
        .and_then(Value::as_str)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
}
