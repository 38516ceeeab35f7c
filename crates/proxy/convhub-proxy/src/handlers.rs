//! Request handlers for the proxy routes

use crate::provider::{ChatReply, UpstreamError, UNREACHABLE_MESSAGE};
use crate::state::ServerState;
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use convhub_core::utils::scrub_message;
use convhub_core::{ChatRequest, ErrorEnvelope, LlmConfig, TestResult};
use serde::Serialize;
use tracing::{error, info, warn};

/// Message returned when `test-config` is missing a field
pub const MISSING_CONFIG_MESSAGE: &str = "Missing LLM configuration details.";

/// Message returned when `chat` is missing a field
pub const MISSING_CHAT_PARAMS_MESSAGE: &str = "Missing required parameters for chat.";

/// Message returned when the provider answered with an error status
pub const UPSTREAM_ERROR_MESSAGE: &str = "Error from external LLM API.";

/// Message returned when the provider could not be reached during chat
pub const TRANSPORT_ERROR_MESSAGE: &str = "Internal server error while contacting LLM API.";

/// `GET /`
pub async fn root() -> &'static str {
    "Backend server is running."
}

/// Health payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// `POST /api/test-config`
///
/// Every classified outcome is a 200 so the frontend can render the verdict
/// inline; only missing fields (400) and request-construction failures (500)
/// use error statuses.
pub async fn test_config_handler(
    State(state): State<ServerState>,
    payload: Result<Json<LlmConfig>, JsonRejection>,
) -> Response {
    let config = match payload {
        Ok(Json(config)) => config,
        Err(rejection) => {
            warn!("test-config rejected body: {}", rejection.body_text());
            return ApiError::BadRequest(MISSING_CONFIG_MESSAGE.to_string()).into_response();
        }
    };

    if !config.is_complete() {
        info!("test-config missing fields: {:?}", config.missing_fields());
        return ApiError::BadRequest(MISSING_CONFIG_MESSAGE.to_string()).into_response();
    }

    info!("test-config model={} url={}", config.model, config.base_url);
    match state.provider.test_config(&config).await {
        Ok(result) => {
            info!(
                "test-config verdict success={} message={}",
                result.success, result.message
            );
            Json(result).into_response()
        }
        Err(UpstreamError::Unreachable(detail)) => {
            warn!("test-config unreachable: {}", scrub_message(&detail));
            Json(TestResult::failed(UNREACHABLE_MESSAGE)).into_response()
        }
        Err(UpstreamError::Internal(detail)) => {
            error!("test-config internal error: {}", scrub_message(&detail));
            ApiError::Internal(format!("An internal error occurred: {}", detail)).into_response()
        }
    }
}

/// `POST /api/chat`
pub async fn chat_handler(
    State(state): State<ServerState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            warn!("chat rejected body: {}", rejection.body_text());
            return ApiError::BadRequest(MISSING_CHAT_PARAMS_MESSAGE.to_string()).into_response();
        }
    };

    if !request.config.is_complete() || request.messages.is_empty() {
        info!(
            "chat missing parameters: fields={:?} messages={}",
            request.config.missing_fields(),
            request.messages.len()
        );
        return ApiError::BadRequest(MISSING_CHAT_PARAMS_MESSAGE.to_string()).into_response();
    }

    info!(
        "chat request model={} messages={}",
        request.config.model,
        request.messages.len()
    );

    match state
        .provider
        .forward_chat(&request.config, &request.messages)
        .await
    {
        Ok(ChatReply::Relayed { content_type, body }) => {
            let content_type = content_type.unwrap_or_else(|| "application/json".to_string());
            Response::builder()
                .status(StatusCode::OK)
                .header(header::CONTENT_TYPE, content_type)
                .body(Body::from(body))
                .unwrap_or_else(|e| {
                    error!("failed to build relayed response: {}", e);
                    ApiError::Internal(e.to_string()).into_response()
                })
        }
        Ok(ChatReply::Rejected { status, body }) => {
            warn!(
                "Error proxying to LLM API: status={} body={}",
                status,
                scrub_message(&body.to_string())
            );
            (
                status,
                Json(ErrorEnvelope::with_error(UPSTREAM_ERROR_MESSAGE, body)),
            )
                .into_response()
        }
        Err(UpstreamError::Unreachable(detail)) => {
            error!("Error proxying to LLM API: {}", scrub_message(&detail));
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorEnvelope::new(TRANSPORT_ERROR_MESSAGE)),
            )
                .into_response()
        }
        Err(UpstreamError::Internal(detail)) => {
            error!("chat internal error: {}", scrub_message(&detail));
            ApiError::Internal(format!("An internal error occurred: {}", detail)).into_response()
        }
    }
}

/// API error types
#[derive(Debug)]
pub enum ApiError {
    /// Client-input error
    BadRequest(String),
    /// Failure inside the proxy itself
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        (status, Json(ErrorEnvelope::new(message))).into_response()
    }
}
