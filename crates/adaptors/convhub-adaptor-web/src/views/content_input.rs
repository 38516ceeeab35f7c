//! Content Input: text area, file drop zone and the Convert action

use convhub_client::documents::ACCEPTED_EXTENSIONS;
use convhub_client::AppState;
use serde::Serialize;

/// Convert button label while idle
pub const CONVERT_LABEL: &str = "Refine to Markdown & Mind Map";

/// Convert button label while a conversion runs
pub const CONVERTING_LABEL: &str = "Converting...";

pub(crate) const TEMPLATE: &str = r#"<section class="panel content-input">
  <h2>Content</h2>
  <form method="post" action="/convert">
    <textarea id="content" name="content" rows="18" placeholder="Paste or type your content here, or drop a file below.">{{content}}</textarea>
    <p><button type="submit" {{#if is_converting}}disabled{{/if}}>{{convert_label}}</button></p>
  </form>
  <form id="upload-form" method="post" action="/content/upload" enctype="multipart/form-data">
    <div id="drop-zone" class="drop-zone">
      Drop a {{accept}} file here, or
      <input id="file-picker" type="file" name="file" accept="{{accept}}">
    </div>
  </form>
  <script>
    (() => {
      const area = document.getElementById('content');
      let chain = Promise.resolve();
      area.addEventListener('input', () => {
        const body = new URLSearchParams({ content: area.value });
        chain = chain.then(() => fetch('/content', { method: 'POST', body })).catch(() => {});
      });
      const zone = document.getElementById('drop-zone');
      const upload = (file) => {
        const data = new FormData();
        data.append('file', file);
        fetch('/content/upload', { method: 'POST', body: data }).finally(() => location.reload());
      };
      zone.addEventListener('dragover', (e) => { e.preventDefault(); zone.classList.add('over'); });
      zone.addEventListener('dragleave', () => zone.classList.remove('over'));
      zone.addEventListener('drop', (e) => {
        e.preventDefault();
        zone.classList.remove('over');
        if (e.dataTransfer.files.length > 0) upload(e.dataTransfer.files[0]);
      });
      document.getElementById('file-picker').addEventListener('change', (e) => {
        if (e.target.files.length > 0) upload(e.target.files[0]);
      });
    })();
  </script>
</section>
"#;

/// View model for the Content Input
#[derive(Debug, Serialize)]
pub struct ContentInputView {
    /// Current buffer
    pub content: String,
    /// A conversion is running
    pub is_converting: bool,
    /// Convert button text
    pub convert_label: &'static str,
    /// `accept` attribute for the file picker
    pub accept: String,
}

impl ContentInputView {
    /// Build from a snapshot
    pub fn from_state(state: &AppState) -> Self {
        Self {
            content: state.content.clone(),
            is_converting: state.is_converting,
            convert_label: if state.is_converting {
                CONVERTING_LABEL
            } else {
                CONVERT_LABEL
            },
            accept: ACCEPTED_EXTENSIONS.join(","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_follows_flag() {
        let mut state = AppState::default();
        assert_eq!(ContentInputView::from_state(&state).convert_label, CONVERT_LABEL);

        state.is_converting = true;
        let view = ContentInputView::from_state(&state);
        assert_eq!(view.convert_label, CONVERTING_LABEL);
        assert_eq!(view.accept, ".txt,.docx");
    }
}
