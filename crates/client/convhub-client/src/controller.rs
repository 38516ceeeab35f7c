//! Application state controller
//!
//! Owns the provider settings, the source content, the converted Markdown
//! and the chat history, and runs the three asynchronous flows (test,
//! convert, chat) against a [`ChatBackend`]. Views read a [`AppState`]
//! snapshot and never mutate state directly.

use crate::api::ChatBackend;
use convhub_core::{
    compose_conversion_prompt, extract_reply, ChatMessage, LlmConfig, ProxyMessage, TestResult,
    MISSING_MARKDOWN_FALLBACK, MISSING_REPLY_FALLBACK,
};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

/// How long a test-config verdict stays visible
pub const DEFAULT_BANNER_TTL: Duration = Duration::from_secs(6);

/// Notice after `save_config`
pub const CONFIG_SAVED_MESSAGE: &str = "Configuration saved!";

/// Notice when convert is requested without content
pub const EMPTY_CONTENT_MESSAGE: &str = "Please provide some content to convert.";

/// Notice when a flow needs settings that were never saved
pub const INCOMPLETE_CONFIG_MESSAGE: &str = "Missing LLM configuration details.";

/// Notice kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Something worked
    Success,
    /// Nothing happened, user action needed
    Info,
    /// A flow failed
    Error,
}

/// One-shot user-facing notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    /// Kind
    pub severity: Severity,
    /// Text shown to the user
    pub text: String,
}

impl Notification {
    fn new(severity: Severity, text: impl Into<String>) -> Self {
        Self {
            severity,
            text: text.into(),
        }
    }
}

/// A test-config verdict and when it was produced
#[derive(Debug, Clone)]
pub struct TestBanner {
    /// Verdict
    pub result: TestResult,
    /// When the verdict arrived
    pub shown_at: Instant,
}

impl TestBanner {
    /// True once `ttl` has passed since the verdict arrived
    pub fn is_expired(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.shown_at) >= ttl
    }
}

/// Everything the views render
#[derive(Debug, Clone, Default)]
pub struct AppState {
    /// Saved provider settings
    pub config: LlmConfig,
    /// What the Config Form shows: the saved settings or unsaved edits
    pub draft_config: LlmConfig,
    /// Source text, verbatim
    pub content: String,
    /// Last conversion result; empty until a conversion succeeds
    pub converted_markdown: String,
    /// Chat history in send/receive order
    pub messages: Vec<ChatMessage>,
    /// A chat reply is pending
    pub is_ai_typing: bool,
    /// A conversion is pending
    pub is_converting: bool,
    /// A config test is pending
    pub is_testing: bool,
    /// Last test verdict, until it expires
    pub test_banner: Option<TestBanner>,
    /// Notices not yet shown
    pub notifications: Vec<Notification>,
}

impl AppState {
    /// What the result preview shows: the converted Markdown if any,
    /// otherwise the raw content
    pub fn preview_content(&self) -> &str {
        if self.converted_markdown.is_empty() {
            &self.content
        } else {
            &self.converted_markdown
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum BusyFlag {
    Testing,
    Converting,
    AiTyping,
}

impl BusyFlag {
    fn slot(self, state: &mut AppState) -> &mut bool {
        match self {
            BusyFlag::Testing => &mut state.is_testing,
            BusyFlag::Converting => &mut state.is_converting,
            BusyFlag::AiTyping => &mut state.is_ai_typing,
        }
    }
}

// Clears its flag on drop, including when the owning future is cancelled.
struct BusyGuard {
    state: Arc<RwLock<AppState>>,
    flag: BusyFlag,
}

impl BusyGuard {
    fn raise(state: &Arc<RwLock<AppState>>, flag: BusyFlag) -> Self {
        *flag.slot(&mut write_state(state)) = true;
        Self {
            state: state.clone(),
            flag,
        }
    }

    // None when the flag is already up.
    fn try_raise(state: &Arc<RwLock<AppState>>, flag: BusyFlag) -> Option<Self> {
        {
            let mut guard = write_state(state);
            let slot = flag.slot(&mut guard);
            if *slot {
                return None;
            }
            *slot = true;
        }
        Some(Self {
            state: state.clone(),
            flag,
        })
    }
}

impl Drop for BusyGuard {
    fn drop(&mut self) {
        *self.flag.slot(&mut write_state(&self.state)) = false;
    }
}

fn write_state(lock: &RwLock<AppState>) -> RwLockWriteGuard<'_, AppState> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

fn read_state(lock: &RwLock<AppState>) -> RwLockReadGuard<'_, AppState> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

/// Application state controller
pub struct AppController<B> {
    backend: Arc<B>,
    state: Arc<RwLock<AppState>>,
    banner_ttl: Duration,
}

impl<B> Clone for AppController<B> {
    fn clone(&self) -> Self {
        Self {
            backend: self.backend.clone(),
            state: self.state.clone(),
            banner_ttl: self.banner_ttl,
        }
    }
}

impl<B: ChatBackend> AppController<B> {
    /// Create a controller with empty state
    pub fn new(backend: B) -> Self {
        Self::with_banner_ttl(backend, DEFAULT_BANNER_TTL)
    }

    /// Create a controller whose test verdicts expire after `ttl`
    pub fn with_banner_ttl(backend: B, ttl: Duration) -> Self {
        Self {
            backend: Arc::new(backend),
            state: Arc::new(RwLock::new(AppState::default())),
            banner_ttl: ttl,
        }
    }

    /// Copy of the current state with any expired banner removed
    pub fn snapshot(&self) -> AppState {
        let mut state = write_state(&self.state);
        let expired = state
            .test_banner
            .as_ref()
            .is_some_and(|b| b.is_expired(self.banner_ttl, Instant::now()));
        if expired {
            state.test_banner = None;
        }
        state.clone()
    }

    /// Drain pending notices
    pub fn take_notifications(&self) -> Vec<Notification> {
        std::mem::take(&mut write_state(&self.state).notifications)
    }

    /// Saved provider settings
    pub fn config(&self) -> LlmConfig {
        read_state(&self.state).config.clone()
    }

    /// Replace the provider settings
    pub fn save_config(&self, config: LlmConfig) {
        info!("saving config: {:?}", config);
        let mut state = write_state(&self.state);
        state.draft_config = config.clone();
        state.config = config;
        state
            .notifications
            .push(Notification::new(Severity::Success, CONFIG_SAVED_MESSAGE));
    }

    /// Keep unsaved Config Form values without touching the saved settings
    pub fn edit_config(&self, config: LlmConfig) {
        write_state(&self.state).draft_config = config;
    }

    /// Probe `config` (the form's current values, saved or not) and keep
    /// the verdict as the visible banner. The tested values stay in the
    /// form; the saved settings are unchanged.
    pub async fn test_config(&self, config: &LlmConfig) -> TestResult {
        self.edit_config(config.clone());
        let result = if config.is_complete() {
            let _busy = BusyGuard::raise(&self.state, BusyFlag::Testing);
            self.backend.test_config(config).await
        } else {
            TestResult::failed(INCOMPLETE_CONFIG_MESSAGE)
        };

        info!(
            "config test success={} message={}",
            result.success, result.message
        );
        write_state(&self.state).test_banner = Some(TestBanner {
            result: result.clone(),
            shown_at: Instant::now(),
        });
        result
    }

    /// Replace the source content, stored exactly as given
    pub fn set_content(&self, text: impl Into<String>) {
        write_state(&self.state).content = text.into();
    }

    /// Ask the provider to rewrite the content as Markdown.
    ///
    /// Ignored while another conversion is running.
    pub async fn convert(&self) {
        let (config, content) = {
            let state = read_state(&self.state);
            (state.config.clone(), state.content.clone())
        };

        if content.is_empty() {
            self.notify(Severity::Info, EMPTY_CONTENT_MESSAGE);
            return;
        }
        if !config.is_complete() {
            self.notify(
                Severity::Error,
                format!("Conversion failed: {}", INCOMPLETE_CONFIG_MESSAGE),
            );
            return;
        }

        let prompt = match compose_conversion_prompt(&content) {
            Ok(prompt) => prompt,
            Err(e) => {
                error!("failed to build conversion prompt: {}", e);
                self.notify(Severity::Error, format!("Conversion failed: {}", e));
                return;
            }
        };

        let Some(_busy) = BusyGuard::try_raise(&self.state, BusyFlag::Converting) else {
            info!("conversion already running, ignoring");
            return;
        };
        match self
            .backend
            .chat(&config, &[ProxyMessage::user(prompt)])
            .await
        {
            Ok(body) => {
                let markdown = extract_reply(&body).unwrap_or_else(|| {
                    warn!("conversion reply had no content");
                    MISSING_MARKDOWN_FALLBACK.to_string()
                });
                write_state(&self.state).converted_markdown = markdown;
            }
            Err(e) => {
                error!("conversion failed: {}", e);
                self.notify(Severity::Error, format!("Conversion failed: {}", e));
            }
        }
    }

    /// Append a user message, send the whole history, append the reply.
    ///
    /// Blank input, and input while a reply is pending, is ignored.
    /// Failures become an AI bubble reading `Error: <message>`.
    pub async fn send_message(&self, text: &str) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        let Some(_busy) = BusyGuard::try_raise(&self.state, BusyFlag::AiTyping) else {
            info!("reply pending, ignoring message");
            return;
        };

        let (config, history) = {
            let mut state = write_state(&self.state);
            state.messages.push(ChatMessage::user(text));
            let history: Vec<ProxyMessage> =
                state.messages.iter().map(ProxyMessage::from).collect();
            (state.config.clone(), history)
        };

        let reply = if config.is_complete() {
            match self.backend.chat(&config, &history).await {
                Ok(body) => extract_reply(&body).unwrap_or_else(|| {
                    warn!("chat reply had no content");
                    MISSING_REPLY_FALLBACK.to_string()
                }),
                Err(e) => {
                    error!("chat failed: {}", e);
                    format!("Error: {}", e)
                }
            }
        } else {
            format!("Error: {}", INCOMPLETE_CONFIG_MESSAGE)
        };

        write_state(&self.state).messages.push(ChatMessage::ai(reply));
    }

    /// Drop the chat history
    pub fn clear_chat(&self) {
        write_state(&self.state).messages.clear();
    }

    /// A chat reply is pending
    pub fn is_ai_typing(&self) -> bool {
        read_state(&self.state).is_ai_typing
    }

    /// A conversion is pending
    pub fn is_converting(&self) -> bool {
        read_state(&self.state).is_converting
    }

    /// Queue a notice for the next render
    pub fn notify(&self, severity: Severity, text: impl Into<String>) {
        write_state(&self.state)
            .notifications
            .push(Notification::new(severity, text));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockChatBackend;
    use convhub_core::{ConvHubError, Role, Sender};
    use serde_json::json;

    fn config() -> LlmConfig {
        LlmConfig::new("https://llm.test/v1/chat/completions", "sk-test", "m1")
    }

    fn completion(text: &str) -> serde_json::Value {
        json!({"choices": [{"message": {"role": "assistant", "content": text}}]})
    }

    fn controller(backend: MockChatBackend) -> AppController<MockChatBackend> {
        let controller = AppController::new(backend);
        controller.save_config(config());
        controller.take_notifications();
        controller
    }

    #[test]
    fn test_save_config_notifies() {
        let controller = AppController::new(MockChatBackend::new());
        controller.save_config(config());
        assert_eq!(controller.config(), config());
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::new(Severity::Success, CONFIG_SAVED_MESSAGE)]
        );
        assert!(controller.take_notifications().is_empty());
    }

    #[test]
    fn test_content_stored_verbatim() {
        let controller = AppController::new(MockChatBackend::new());
        controller.set_content("  line one\n\n\tline two  ");
        assert_eq!(controller.snapshot().content, "  line one\n\n\tline two  ");
        assert_eq!(
            controller.snapshot().preview_content(),
            "  line one\n\n\tline two  "
        );
    }

    #[tokio::test]
    async fn test_send_message_appends_reply() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_chat()
            .withf(|cfg, messages| {
                cfg.model == "m1"
                    && messages.len() == 1
                    && messages[0].role == Role::User
                    && messages[0].content == "hi"
            })
            .times(1)
            .returning(|_, _| Ok(completion("X")));

        let controller = controller(backend);
        controller.send_message("hi").await;

        let state = controller.snapshot();
        assert_eq!(state.messages.len(), 2);
        assert_eq!(state.messages[1], ChatMessage::ai("X"));
        assert!(!state.is_ai_typing);
    }

    #[tokio::test]
    async fn test_history_is_sent_in_order_with_roles() {
        let mut backend = MockChatBackend::new();
        let mut seq = mockall::Sequence::new();
        backend
            .expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(completion("ai1")));
        backend
            .expect_chat()
            .withf(|_, messages| {
                messages
                    .iter()
                    .map(|m| (m.role, m.content.as_str()))
                    .eq([
                        (Role::User, "user1"),
                        (Role::Assistant, "ai1"),
                        (Role::User, "user2"),
                    ])
            })
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(completion("ai2")));

        let controller = controller(backend);
        controller.send_message("user1").await;
        controller.send_message("user2").await;

        let texts: Vec<String> = controller
            .snapshot()
            .messages
            .into_iter()
            .map(|m| m.text)
            .collect();
        assert_eq!(texts, ["user1", "ai1", "user2", "ai2"]);
    }

    #[tokio::test]
    async fn test_blank_message_ignored() {
        let controller = controller(MockChatBackend::new());
        controller.send_message("   \n").await;
        assert!(controller.snapshot().messages.is_empty());
    }

    #[tokio::test]
    async fn test_chat_error_becomes_bubble() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_chat()
            .returning(|_, _| Err(ConvHubError::api(429, "Error from external LLM API.")));

        let controller = controller(backend);
        controller.send_message("hi").await;

        let state = controller.snapshot();
        assert_eq!(state.messages[1].sender, Sender::Ai);
        assert_eq!(state.messages[1].text, "Error: Error from external LLM API.");
        assert!(!state.is_ai_typing);
    }

    #[tokio::test]
    async fn test_missing_reply_uses_fallback() {
        let mut backend = MockChatBackend::new();
        backend.expect_chat().returning(|_, _| Ok(json!({})));

        let controller = controller(backend);
        controller.send_message("hi").await;
        assert_eq!(
            controller.snapshot().messages[1].text,
            MISSING_REPLY_FALLBACK
        );
    }

    #[tokio::test]
    async fn test_unsaved_config_never_calls_backend() {
        let controller = AppController::new(MockChatBackend::new());
        controller.send_message("hi").await;
        assert_eq!(
            controller.snapshot().messages[1].text,
            format!("Error: {}", INCOMPLETE_CONFIG_MESSAGE)
        );

        controller.set_content("text");
        controller.convert().await;
        assert_eq!(
            controller.take_notifications()[0].severity,
            Severity::Error
        );

        let result = controller.test_config(&LlmConfig::default()).await;
        assert!(!result.success);
        assert_eq!(result.message, INCOMPLETE_CONFIG_MESSAGE);
    }

    #[tokio::test]
    async fn test_clear_chat_restarts_history() {
        let mut backend = MockChatBackend::new();
        let mut seq = mockall::Sequence::new();
        backend
            .expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(completion("first")));
        backend
            .expect_chat()
            .withf(|_, messages| messages.len() == 1 && messages[0].content == "again")
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(completion("second")));

        let controller = controller(backend);
        controller.send_message("hello").await;
        controller.clear_chat();
        assert!(controller.snapshot().messages.is_empty());

        controller.send_message("again").await;
        let messages = controller.snapshot().messages;
        assert_eq!(messages[0], ChatMessage::user("again"));
        assert_eq!(messages[1], ChatMessage::ai("second"));
    }

    #[tokio::test]
    async fn test_convert_sends_single_prompt() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_chat()
            .withf(|_, messages| {
                messages.len() == 1
                    && messages[0].role == Role::User
                    && messages[0].content.ends_with("\n\n---\n\nraw notes")
            })
            .times(1)
            .returning(|_, _| Ok(completion("# Notes")));

        let controller = controller(backend);
        controller.set_content("raw notes");
        controller.convert().await;

        let state = controller.snapshot();
        assert_eq!(state.converted_markdown, "# Notes");
        assert_eq!(state.preview_content(), "# Notes");
        assert!(!state.is_converting);
    }

    #[tokio::test]
    async fn test_convert_without_content_only_notifies() {
        let controller = controller(MockChatBackend::new());
        controller.convert().await;
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::new(Severity::Info, EMPTY_CONTENT_MESSAGE)]
        );
    }

    #[tokio::test]
    async fn test_convert_failure_keeps_previous_markdown() {
        let mut backend = MockChatBackend::new();
        let mut seq = mockall::Sequence::new();
        backend
            .expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Ok(completion("# Old")));
        backend
            .expect_chat()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_, _| Err(ConvHubError::api(500, "boom")));

        let controller = controller(backend);
        controller.set_content("text");
        controller.convert().await;
        controller.convert().await;

        assert_eq!(controller.snapshot().converted_markdown, "# Old");
        assert_eq!(
            controller.take_notifications(),
            vec![Notification::new(Severity::Error, "Conversion failed: boom")]
        );
    }

    #[tokio::test]
    async fn test_convert_missing_content_uses_fallback() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_chat()
            .returning(|_, _| Ok(json!({"choices": []})));

        let controller = controller(backend);
        controller.set_content("text");
        controller.convert().await;
        assert_eq!(
            controller.snapshot().converted_markdown,
            MISSING_MARKDOWN_FALLBACK
        );
    }

    #[tokio::test]
    async fn test_banner_expires() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_test_config()
            .returning(|_| TestResult::ok("Configuration is valid."));

        let controller = AppController::with_banner_ttl(backend, Duration::from_millis(20));
        let result = controller.test_config(&config()).await;
        assert!(result.success);

        let banner = controller.snapshot().test_banner;
        assert_eq!(banner.map(|b| b.result), Some(result));
        assert!(!controller.snapshot().is_testing);

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(controller.snapshot().test_banner.is_none());
    }

    #[tokio::test]
    async fn test_tested_values_stay_in_form_unsaved() {
        let mut backend = MockChatBackend::new();
        backend
            .expect_test_config()
            .returning(|_| TestResult::ok("Configuration is valid."));

        let controller = controller(backend);
        let typed = LlmConfig::new("https://typed.test/v1", "sk-typed", "m2");
        controller.test_config(&typed).await;

        let state = controller.snapshot();
        assert_eq!(state.draft_config, typed);
        assert_eq!(state.config, config());

        controller.save_config(config());
        assert_eq!(controller.snapshot().draft_config, config());
    }

    struct GatedBackend {
        release: tokio::sync::Notify,
        calls: std::sync::atomic::AtomicUsize,
    }

    #[async_trait::async_trait]
    impl ChatBackend for GatedBackend {
        async fn test_config(&self, _config: &LlmConfig) -> TestResult {
            TestResult::ok("ok")
        }

        async fn chat(
            &self,
            _config: &LlmConfig,
            _messages: &[ProxyMessage],
        ) -> convhub_core::Result<serde_json::Value> {
            self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            self.release.notified().await;
            Ok(completion("late"))
        }
    }

    #[tokio::test]
    async fn test_send_while_pending_is_ignored() {
        let controller = AppController::new(GatedBackend {
            release: tokio::sync::Notify::new(),
            calls: Default::default(),
        });
        controller.save_config(config());

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.send_message("first").await }
        });
        while !controller.is_ai_typing() {
            tokio::task::yield_now().await;
        }

        controller.send_message("second").await;
        controller.set_content("text");
        assert_eq!(controller.snapshot().messages, vec![ChatMessage::user("first")]);

        controller.backend.release.notify_one();
        pending.await.unwrap();

        let state = controller.snapshot();
        assert_eq!(
            state.messages,
            vec![ChatMessage::user("first"), ChatMessage::ai("late")]
        );
        assert!(!state.is_ai_typing);
        assert_eq!(
            controller
                .backend
                .calls
                .load(std::sync::atomic::Ordering::SeqCst),
            1
        );
    }

    #[tokio::test]
    async fn test_cancelled_convert_clears_flag() {
        let controller = AppController::new(GatedBackend {
            release: tokio::sync::Notify::new(),
            calls: Default::default(),
        });
        controller.save_config(config());
        controller.set_content("text");

        let pending = tokio::spawn({
            let controller = controller.clone();
            async move { controller.convert().await }
        });
        while !controller.is_converting() {
            tokio::task::yield_now().await;
        }

        pending.abort();
        let _ = pending.await;
        assert!(!controller.is_converting());
        assert!(controller.snapshot().converted_markdown.is_empty());
    }

    #[test]
    fn test_busy_guard_clears_flag() {
        let state = Arc::new(RwLock::new(AppState::default()));
        {
            let _guard = BusyGuard::raise(&state, BusyFlag::Converting);
            assert!(read_state(&state).is_converting);
        }
        assert!(!read_state(&state).is_converting);
    }
}
