//! Markdown to HTML

use pulldown_cmark::{html, CowStr, Event, Options, Parser, Tag};

/// URL schemes allowed in link and image targets; anything else becomes `#`
const SAFE_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Turns Markdown into an HTML fragment
pub trait MarkdownRenderer: Send + Sync {
    /// Render `markdown` as HTML
    fn render_html(&self, markdown: &str) -> String;
}

/// GitHub-flavored Markdown: tables, strikethrough, task lists, footnotes.
///
/// Raw HTML in the source is shown as text, never passed through. Link and
/// image targets keep only relative URLs and the schemes in [`SAFE_SCHEMES`].
#[derive(Debug, Clone, Copy, Default)]
pub struct GfmRenderer;

impl GfmRenderer {
    fn options() -> Options {
        Options::ENABLE_TABLES
            | Options::ENABLE_STRIKETHROUGH
            | Options::ENABLE_TASKLISTS
            | Options::ENABLE_FOOTNOTES
    }
}

impl MarkdownRenderer for GfmRenderer {
    fn render_html(&self, markdown: &str) -> String {
        let parser = Parser::new_ext(markdown, Self::options()).map(|event| match event {
            Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
            Event::Start(Tag::Link {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Link {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            Event::Start(Tag::Image {
                link_type,
                dest_url,
                title,
                id,
            }) => Event::Start(Tag::Image {
                link_type,
                dest_url: safe_url(dest_url),
                title,
                id,
            }),
            other => other,
        });

        let mut out = String::with_capacity(markdown.len() * 3 / 2);
        html::push_html(&mut out, parser);
        out
    }
}

fn safe_url(url: CowStr<'_>) -> CowStr<'_> {
    // Browsers ignore whitespace and control characters inside a scheme.
    let compact: String = url
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();
    let scheme = compact
        .split_once(':')
        .map(|(head, _)| head)
        .filter(|head| !head.contains(['/', '?', '#']));

    match scheme {
        Some(scheme) if !SAFE_SCHEMES.contains(&scheme.to_ascii_lowercase().as_str()) => {
            CowStr::Borrowed("#")
        }
        _ => url,
    }
}
