//! Server-rendered view components
//!
//! Each component turns an [`AppState`] snapshot into a small serializable
//! view model and owns one handlebars partial. The page template stitches
//! the partials together.

pub mod chat_panel;
pub mod config_form;
pub mod content_input;
pub mod result_preview;

pub use chat_panel::ChatPanelView;
pub use config_form::ConfigFormView;
pub use content_input::ContentInputView;
pub use result_preview::{PreviewTab, ResultPreview, ResultPreviewView};

use convhub_client::{AppState, MarkdownRenderer, Notification};
use convhub_core::{Result, TemplateEngine};
use serde::Serialize;
use std::time::{Duration, Instant};

const PAGE_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
{{#if busy}}<meta http-equiv="refresh" content="1">{{/if}}
<title>Content Conversion &amp; AI Interaction Hub</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0; background: #f4f5f7; color: #222; }
  header { padding: 12px 20px; background: #1f2937; color: #fff; }
  main { display: grid; grid-template-columns: 360px 1fr 1fr; gap: 16px; padding: 16px; }
  .panel { background: #fff; border-radius: 8px; padding: 16px; box-shadow: 0 1px 3px rgba(0,0,0,.1); }
  label { display: block; font-size: 13px; margin-top: 8px; }
  input[type=text], input[type=password], textarea { width: 100%; box-sizing: border-box; padding: 6px; }
  button[disabled] { opacity: .6; cursor: not-allowed; }
  .toasts { position: fixed; top: 12px; right: 12px; }
  .toast { padding: 8px 12px; margin-bottom: 6px; border-radius: 6px; color: #fff; }
  .toast.success { background: #16a34a; } .toast.info { background: #2563eb; } .toast.error { background: #dc2626; }
  .banner { margin-top: 8px; padding: 6px 8px; border-radius: 4px; }
  .banner.success { background: #dcfce7; } .banner.error { background: #fee2e2; }
  .spinner { display: inline-block; width: 10px; height: 10px; border: 2px solid #999; border-top-color: transparent; border-radius: 50%; animation: spin 1s linear infinite; }
  @keyframes spin { to { transform: rotate(360deg); } }
  .drop-zone { border: 2px dashed #bbb; padding: 12px; text-align: center; margin-top: 8px; }
  .drop-zone.over { border-color: #2563eb; background: #eff6ff; }
  #chat-log { height: 320px; overflow-y: auto; display: flex; flex-direction: column; gap: 6px; }
  .bubble { max-width: 80%; padding: 6px 10px; border-radius: 10px; white-space: pre-wrap; }
  .bubble.user { align-self: flex-end; background: #2563eb; color: #fff; }
  .bubble.ai { align-self: flex-start; background: #e5e7eb; }
  .placeholder, .typing { color: #888; font-style: italic; }
  .tabs form { display: inline; }
  .tabs button.active { font-weight: bold; border-bottom: 2px solid #2563eb; }
  .downloads a.disabled { pointer-events: none; color: #aaa; }
  .mindmap-view { overflow: auto; }
</style>
</head>
<body>
<header><strong>Content Conversion &amp; AI Interaction Hub</strong></header>
<div class="toasts">
{{#each notifications}}<div class="toast {{severity}}">{{text}}</div>{{/each}}
</div>
<main>
  <div>
    {{#with config_form}}{{> config_form}}{{/with}}
    {{#with chat_panel}}{{> chat_panel}}{{/with}}
  </div>
  {{#with content_input}}{{> content_input}}{{/with}}
  {{#with result_preview}}{{> result_preview}}{{/with}}
</main>
<script>
  setTimeout(() => document.querySelectorAll('.toast').forEach(t => t.remove()), 4000);
</script>
</body>
</html>
"#;

/// Everything the page template needs
#[derive(Debug, Serialize)]
pub struct PageView {
    /// Notices drained from the controller
    pub notifications: Vec<Notification>,
    /// Some flow is pending; the page refreshes itself
    pub busy: bool,
    /// Config Form
    pub config_form: ConfigFormView,
    /// Content Input
    pub content_input: ContentInputView,
    /// Chat Panel
    pub chat_panel: ChatPanelView,
    /// Result Preview
    pub result_preview: ResultPreviewView,
}

impl PageView {
    /// Assemble the page from a state snapshot
    pub fn build(
        state: &AppState,
        notifications: Vec<Notification>,
        preview: &mut ResultPreview,
        renderer: &dyn MarkdownRenderer,
        banner_ttl: Duration,
    ) -> Self {
        Self {
            notifications,
            busy: state.is_testing || state.is_converting || state.is_ai_typing,
            config_form: ConfigFormView::from_state(state, banner_ttl, Instant::now()),
            content_input: ContentInputView::from_state(state),
            chat_panel: ChatPanelView::from_state(state),
            result_preview: preview.view(state.preview_content(), renderer),
        }
    }
}

/// Compiled templates
pub struct Views {
    engine: TemplateEngine,
}

impl Views {
    /// Register the page and every component partial
    pub fn new() -> Result<Self> {
        let mut engine = TemplateEngine::new();
        engine.register_template("page", PAGE_TEMPLATE)?;
        engine.register_template("config_form", config_form::TEMPLATE)?;
        engine.register_template("content_input", content_input::TEMPLATE)?;
        engine.register_template("chat_panel", chat_panel::TEMPLATE)?;
        engine.register_template("result_preview", result_preview::TEMPLATE)?;
        Ok(Self { engine })
    }

    /// Render the full page
    pub fn render_page(&self, page: &PageView) -> Result<String> {
        self.engine.render_named("page", page)
    }
}
