//! Request handlers for the web UI
//!
//! Actions are plain form posts answered with `303 See Other` back to `/`.
//! Flows that call the proxy run on a spawned task so the page can show
//! busy indicators and refresh itself until they finish.

use crate::state::WebState;
use crate::views::{PageView, PreviewTab};
use axum::{
    extract::{Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use convhub_client::{Artifact, ChatBackend, Severity, READ_FAILED_MESSAGE};
use convhub_core::{ConvHubError, LlmConfig};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::{debug, error, warn};

/// How long an action waits for its flow before redirecting
pub const SETTLE_WINDOW: Duration = Duration::from_millis(300);

/// Body of the 409 answer to a mind-map download without content
pub const NO_CONTENT_MESSAGE: &str = "There is no content to export yet.";

/// Config Form fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigFields {
    /// Base URL
    #[serde(default)]
    pub base_url: String,
    /// API key
    #[serde(default)]
    pub api_key: String,
    /// Model
    #[serde(default)]
    pub model: String,
}

impl From<ConfigFields> for LlmConfig {
    fn from(fields: ConfigFields) -> Self {
        LlmConfig::new(
            fields.base_url.trim(),
            fields.api_key.trim(),
            fields.model.trim(),
        )
    }
}

/// Content text area
#[derive(Debug, Deserialize)]
pub struct ContentFields {
    /// Whole buffer
    #[serde(default)]
    pub content: Option<String>,
}

/// Chat box
#[derive(Debug, Deserialize)]
pub struct ChatFields {
    /// Message text
    #[serde(default)]
    pub text: String,
}

/// Tab switch
#[derive(Debug, Deserialize)]
pub struct TabFields {
    /// Tab to show
    pub tab: PreviewTab,
}

/// Health payload
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always "ok" while the process serves requests
    pub status: &'static str,
    /// Crate version
    pub version: &'static str,
}

// Run `flow` in the background, giving it a short head start so quick
// answers are visible on the redirected page.
async fn run_flow<F>(flow: F)
where
    F: Future<Output = ()> + Send + 'static,
{
    let handle = tokio::spawn(flow);
    if tokio::time::timeout(SETTLE_WINDOW, handle).await.is_err() {
        debug!("flow still running after {:?}", SETTLE_WINDOW);
    }
}

/// `GET /`
pub async fn index<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
) -> Result<Html<String>, WebError> {
    let snapshot = state.controller.snapshot();
    let notifications = state.controller.take_notifications();
    let page = {
        let mut preview = state.preview();
        PageView::build(
            &snapshot,
            notifications,
            &mut preview,
            state.renderer.as_ref(),
            state.config.banner_ttl(),
        )
    };
    Ok(Html(state.views.render_page(&page)?))
}

/// `POST /config/save`
pub async fn save_config<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    Form(fields): Form<ConfigFields>,
) -> Redirect {
    state.controller.save_config(fields.into());
    Redirect::to("/")
}

/// `POST /config/draft`; called on every edit of the Config Form so
/// unsaved values survive page refreshes
pub async fn edit_config<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    Form(fields): Form<ConfigFields>,
) -> StatusCode {
    state.controller.edit_config(fields.into());
    StatusCode::NO_CONTENT
}

/// `POST /config/test`; tests the submitted values without saving them
pub async fn test_config<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    Form(fields): Form<ConfigFields>,
) -> Redirect {
    let config: LlmConfig = fields.into();
    let controller = state.controller.clone();
    run_flow(async move {
        controller.test_config(&config).await;
    })
    .await;
    Redirect::to("/")
}

/// `POST /content`; called on every edit of the text area
pub async fn set_content<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    Form(fields): Form<ContentFields>,
) -> StatusCode {
    state
        .controller
        .set_content(fields.content.unwrap_or_default());
    StatusCode::NO_CONTENT
}

/// `POST /content/upload`; the first file part replaces the buffer
pub async fn upload<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    mut multipart: Multipart,
) -> Redirect {
    match read_first_file(&mut multipart).await {
        Ok(Some((file_name, bytes))) => match state.extractor.extract(&file_name, &bytes) {
            Ok(text) => {
                debug!("loaded {} ({} bytes)", file_name, bytes.len());
                state.controller.set_content(text);
            }
            Err(e) => {
                warn!("failed to extract {}: {}", file_name, e);
                state.controller.notify(Severity::Error, READ_FAILED_MESSAGE);
            }
        },
        Ok(None) => debug!("upload without a file part"),
        Err(e) => {
            warn!("failed to read upload: {}", e);
            state.controller.notify(Severity::Error, READ_FAILED_MESSAGE);
        }
    }
    Redirect::to("/")
}

async fn read_first_file(
    multipart: &mut Multipart,
) -> Result<Option<(String, Vec<u8>)>, axum::extract::multipart::MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let bytes = field.bytes().await?;
        return Ok(Some((file_name, bytes.to_vec())));
    }
    Ok(None)
}

/// `POST /convert`; takes the text area with it
pub async fn convert<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    Form(fields): Form<ContentFields>,
) -> Redirect {
    if let Some(content) = fields.content {
        state.controller.set_content(content);
    }
    if state.controller.is_converting() {
        debug!("conversion already running");
        return Redirect::to("/");
    }

    let controller = state.controller.clone();
    run_flow(async move { controller.convert().await }).await;
    Redirect::to("/")
}

/// `POST /chat`
pub async fn chat<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    Form(fields): Form<ChatFields>,
) -> Redirect {
    let controller = state.controller.clone();
    run_flow(async move { controller.send_message(&fields.text).await }).await;
    Redirect::to("/")
}

/// `POST /chat/clear`
pub async fn clear_chat<B: ChatBackend + 'static>(State(state): State<WebState<B>>) -> Redirect {
    state.controller.clear_chat();
    Redirect::to("/")
}

/// `POST /preview/tab`
pub async fn preview_tab<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
    Form(fields): Form<TabFields>,
) -> Redirect {
    state.preview().set_tab(fields.tab);
    Redirect::to("/")
}

/// `GET /download/markdown`
pub async fn download_markdown<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
) -> Response {
    let snapshot = state.controller.snapshot();
    artifact_response(Artifact::markdown(snapshot.preview_content()))
}

/// `GET /download/mindmap`; 409 when there is nothing to map
pub async fn download_mind_map<B: ChatBackend + 'static>(
    State(state): State<WebState<B>>,
) -> Response {
    let snapshot = state.controller.snapshot();
    let artifact = state
        .preview()
        .mind_map_for(snapshot.preview_content())
        .map(Artifact::mind_map);

    match artifact {
        Some(artifact) => artifact_response(artifact),
        None => (StatusCode::CONFLICT, NO_CONTENT_MESSAGE).into_response(),
    }
}

/// `GET /health`
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

fn artifact_response(artifact: Artifact) -> Response {
    (
        [
            (header::CONTENT_TYPE, artifact.content_type.to_string()),
            (header::CONTENT_DISPOSITION, artifact.content_disposition()),
        ],
        artifact.bytes,
    )
        .into_response()
}

/// Web UI errors
#[derive(Debug, thiserror::Error)]
pub enum WebError {
    /// A template failed to render
    #[error(transparent)]
    Render(#[from] ConvHubError),
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        error!("web ui error: {}", self);
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_fields_are_trimmed() {
        let config: LlmConfig = ConfigFields {
            base_url: " https://llm.test/v1 ".to_string(),
            api_key: "sk-1\n".to_string(),
            model: "m".to_string(),
        }
        .into();
        assert_eq!(config, LlmConfig::new("https://llm.test/v1", "sk-1", "m"));
    }

    #[test]
    fn test_web_error_response() {
        let response = WebError::from(ConvHubError::template("bad")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
