//! Result Preview: Markdown and mind-map tabs plus downloads

use convhub_client::render::transform;
use convhub_client::{MarkdownRenderer, MindMap};
use serde::{Deserialize, Serialize};

/// Rendered in the Markdown tab while there is no content
pub const PLACEHOLDER_MARKDOWN: &str = "# Your refined Markdown will appear here.";

pub(crate) const TEMPLATE: &str = r#"<section class="panel result-preview">
  <div class="tabs">
    <form method="post" action="/preview/tab"><input type="hidden" name="tab" value="markdown"><button type="submit" class="{{#if markdown_active}}active{{/if}}">Markdown</button></form>
    <form method="post" action="/preview/tab"><input type="hidden" name="tab" value="mindmap"><button type="submit" class="{{#if mind_map_active}}active{{/if}}">Mind Map</button></form>
    <span class="downloads">
      <a href="/download/markdown" download="conversion-result.md">Download .md</a>
      {{#if has_content}}<a href="/download/mindmap" download="mindmap.svg">Download .svg</a>{{else}}<a class="disabled" aria-disabled="true">Download .svg</a>{{/if}}
    </span>
  </div>
  {{#if markdown_active}}<article class="markdown-view">{{{html}}}</article>{{/if}}
  {{#if mind_map_active}}<div class="mindmap-view">{{#if svg}}{{{svg}}}{{else}}<p class="placeholder">Nothing to map yet.</p>{{/if}}</div>{{/if}}
</section>
"#;

/// Active preview tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewTab {
    /// Rendered Markdown
    #[default]
    Markdown,
    /// Mind-map diagram
    #[serde(alias = "mind-map")]
    MindMap,
}

/// Preview state that outlives a single render
#[derive(Debug, Default)]
pub struct ResultPreview {
    tab: PreviewTab,
    mind_map: Option<MindMap>,
}

impl ResultPreview {
    /// Active tab
    pub fn tab(&self) -> PreviewTab {
        self.tab
    }

    /// Switch tabs
    pub fn set_tab(&mut self, tab: PreviewTab) {
        self.tab = tab;
    }

    /// Mind map for `content`, updating the existing instance in place.
    /// `None` when there is no content.
    pub fn mind_map_for(&mut self, content: &str) -> Option<&MindMap> {
        if content.is_empty() {
            return None;
        }
        let root = transform(content);
        if let Some(map) = self.mind_map.as_mut() {
            map.set_data(root);
        } else {
            self.mind_map = Some(MindMap::create(root));
        }
        self.mind_map.as_ref()
    }

    /// View model for `content`; the mind map is only recomputed while its
    /// tab is active
    pub fn view(&mut self, content: &str, renderer: &dyn MarkdownRenderer) -> ResultPreviewView {
        let has_content = !content.is_empty();
        let (html, svg) = match self.tab {
            PreviewTab::Markdown => {
                let source = if has_content {
                    content
                } else {
                    PLACEHOLDER_MARKDOWN
                };
                (Some(renderer.render_html(source)), None)
            }
            PreviewTab::MindMap => (
                None,
                self.mind_map_for(content).map(|m| m.svg().to_string()),
            ),
        };

        ResultPreviewView {
            markdown_active: self.tab == PreviewTab::Markdown,
            mind_map_active: self.tab == PreviewTab::MindMap,
            has_content,
            html,
            svg,
        }
    }
}

/// View model for the Result Preview
#[derive(Debug, Serialize)]
pub struct ResultPreviewView {
    /// Markdown tab selected
    pub markdown_active: bool,
    /// Mind Map tab selected
    pub mind_map_active: bool,
    /// Preview content is non-empty
    pub has_content: bool,
    /// Rendered Markdown (Markdown tab only)
    pub html: Option<String>,
    /// Mind-map SVG (Mind Map tab only)
    pub svg: Option<String>,
}
