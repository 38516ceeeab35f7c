//! Chat Panel: history, typing indicator and the message box

use convhub_client::AppState;
use convhub_core::Sender;
use serde::Serialize;

pub(crate) const TEMPLATE: &str = r#"<section class="panel chat-panel">
  <h2>Chat</h2>
  <div id="chat-log">
    {{#each messages}}<div class="bubble {{class}}">{{text}}</div>{{/each}}
    {{#if is_empty}}<p class="placeholder">Chat history will appear here.</p>{{/if}}
    {{#if is_ai_typing}}<p class="typing">AI is typing...</p>{{/if}}
  </div>
  <form id="chat-form" method="post" action="/chat">
    <textarea id="chat-input" name="text" rows="2" placeholder="Ask something..." {{#if is_ai_typing}}disabled{{/if}}></textarea>
    <button type="submit" {{#if is_ai_typing}}disabled{{/if}}>Send</button>
  </form>
  <form method="post" action="/chat/clear"><button type="submit">Clear</button></form>
  <script>
    (() => {
      const log = document.getElementById('chat-log');
      log.scrollTop = log.scrollHeight;
      const input = document.getElementById('chat-input');
      input.addEventListener('keydown', (e) => {
        if (e.key === 'Enter' && !e.shiftKey) {
          e.preventDefault();
          if (input.value.trim() !== '') input.form.requestSubmit();
        }
      });
    })();
  </script>
</section>
"#;

/// One chat bubble
#[derive(Debug, Serialize)]
pub struct BubbleView {
    /// `user` (right) or `ai` (left)
    pub class: &'static str,
    /// Message text
    pub text: String,
}

/// View model for the Chat Panel
#[derive(Debug, Serialize)]
pub struct ChatPanelView {
    /// History, oldest first
    pub messages: Vec<BubbleView>,
    /// No history yet
    pub is_empty: bool,
    /// A reply is pending
    pub is_ai_typing: bool,
}

impl ChatPanelView {
    /// Build from a snapshot
    pub fn from_state(state: &AppState) -> Self {
        let messages = state
            .messages
            .iter()
            .map(|m| BubbleView {
                class: match m.sender {
                    Sender::User => "user",
                    Sender::Ai => "ai",
                },
                text: m.text.clone(),
            })
            .collect::<Vec<_>>();

        Self {
            is_empty: messages.is_empty(),
            messages,
            is_ai_typing: state.is_ai_typing,
        }
    }
}
