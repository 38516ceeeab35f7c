//! Common test utilities and a mock chat-completion provider

#![allow(dead_code)]

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::post,
    Json, Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Test API key
pub const TEST_API_KEY: &str = "test-api-key-12345";

/// Test model
pub const TEST_MODEL: &str = "test-model";

/// Request captured by the mock provider
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

/// State for the mock provider
pub struct MockProviderState {
    pub status: StatusCode,
    pub body: serde_json::Value,
    pub requests: RwLock<Vec<RecordedRequest>>,
}

/// Start a mock provider that answers every POST with `status` and `body`
pub async fn start_mock_provider(
    status: StatusCode,
    body: serde_json::Value,
) -> (SocketAddr, Arc<MockProviderState>) {
    let state = Arc::new(MockProviderState {
        status,
        body,
        requests: RwLock::new(Vec::new()),
    });

    let app = Router::new()
        .route("/v1/chat/completions", post(mock_completion))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

async fn mock_completion(
    State(state): State<Arc<MockProviderState>>,
    headers: HeaderMap,
    body: String,
) -> impl IntoResponse {
    let body = serde_json::from_str(&body).unwrap_or(serde_json::Value::Null);
    state.requests.write().await.push(RecordedRequest {
        authorization: headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string),
        body,
    });
    (state.status, Json(state.body.clone()))
}

/// Completion endpoint URL for a mock provider
pub fn completions_url(addr: SocketAddr) -> String {
    format!("http://{}/v1/chat/completions", addr)
}

/// An address nothing listens on
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    completions_url(addr)
}
