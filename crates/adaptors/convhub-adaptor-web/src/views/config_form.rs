//! Config Form: provider settings, save and test

use convhub_client::AppState;
use serde::Serialize;
use std::time::{Duration, Instant};

pub(crate) const TEMPLATE: &str = r#"<section class="panel config-form">
  <h2>LLM Configuration</h2>
  <form id="config-form" method="post" action="/config/save">
    <label for="base-url">Base URL</label>
    <input id="base-url" type="text" name="baseUrl" value="{{base_url}}" placeholder="https://api.openai.com/v1/chat/completions">
    <label for="api-key">API Key</label>
    <input id="api-key" type="password" name="apiKey" value="{{api_key}}" autocomplete="off">
    <label for="model">Model Name</label>
    <input id="model" type="text" name="model" value="{{model}}" placeholder="gpt-4o-mini">
    <p>
      <button type="submit">Save</button>
      <button type="submit" formaction="/config/test" {{#if is_testing}}disabled{{/if}}>
        {{#if is_testing}}<span class="spinner"></span> Testing...{{else}}Test Config{{/if}}
      </button>
    </p>
  </form>
  <script>
    (() => {
      const form = document.getElementById('config-form');
      let chain = Promise.resolve();
      form.addEventListener('input', () => {
        const body = new URLSearchParams(new FormData(form));
        chain = chain.then(() => fetch('/config/draft', { method: 'POST', body })).catch(() => {});
      });
    })();
  </script>
  {{#with banner}}
  <div id="test-banner" class="banner {{#if success}}success{{else}}error{{/if}}">{{message}}</div>
  <script>setTimeout(() => document.getElementById('test-banner')?.remove(), {{remaining_ms}});</script>
  {{/with}}
</section>
"#;

/// Test verdict still on screen
#[derive(Debug, Serialize)]
pub struct BannerView {
    /// Verdict
    pub success: bool,
    /// Explanation
    pub message: String,
    /// Time left before it disappears
    pub remaining_ms: u64,
}

/// View model for the Config Form
#[derive(Debug, Serialize)]
pub struct ConfigFormView {
    /// Base URL in the form
    pub base_url: String,
    /// API key in the form
    pub api_key: String,
    /// Model in the form
    pub model: String,
    /// A test is in flight
    pub is_testing: bool,
    /// Last verdict, if not expired
    pub banner: Option<BannerView>,
}

impl ConfigFormView {
    /// Build from a snapshot; `now` decides how long the banner has left
    pub fn from_state(state: &AppState, banner_ttl: Duration, now: Instant) -> Self {
        let banner = state
            .test_banner
            .as_ref()
            .filter(|b| !b.is_expired(banner_ttl, now))
            .map(|b| BannerView {
                success: b.result.success,
                message: b.result.message.clone(),
                remaining_ms: banner_ttl
                    .saturating_sub(now.saturating_duration_since(b.shown_at))
                    .as_millis() as u64,
            });

        Self {
            base_url: state.draft_config.base_url.clone(),
            api_key: state.draft_config.api_key.clone(),
            model: state.draft_config.model.clone(),
            is_testing: state.is_testing,
            banner,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use convhub_client::TestBanner;
    use convhub_core::{LlmConfig, TestResult};

    #[test]
    fn test_banner_time_left() {
        let shown_at = Instant::now();
        let state = AppState {
            test_banner: Some(TestBanner {
                result: TestResult::failed("Authentication failed. Check your API Key."),
                shown_at,
            }),
            ..Default::default()
        };

        let ttl = Duration::from_secs(6);
        let view = ConfigFormView::from_state(&state, ttl, shown_at + Duration::from_secs(2));
        let banner = view.banner.unwrap();
        assert!(!banner.success);
        assert_eq!(banner.remaining_ms, 4000);

        let view = ConfigFormView::from_state(&state, ttl, shown_at + ttl);
        assert!(view.banner.is_none());
    }

    #[test]
    fn test_fields_show_unsaved_values() {
        let state = AppState {
            config: LlmConfig::new("https://saved.test/v1", "sk-saved", "m1"),
            draft_config: LlmConfig::new("https://typed.test/v1", "sk-typed", "m2"),
            ..Default::default()
        };

        let view = ConfigFormView::from_state(&state, Duration::from_secs(6), Instant::now());
        assert_eq!(view.base_url, "https://typed.test/v1");
        assert_eq!(view.api_key, "sk-typed");
        assert_eq!(view.model, "m2");
    }
}
