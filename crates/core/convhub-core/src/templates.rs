//! Template engine for prompts and HTML views

use crate::{ConvHubError, Result};
use handlebars::Handlebars;
use serde::Serialize;

/// Instruction wrapped around the user's content when asking the provider
/// for a Markdown rewrite. `{{content}}` is substituted verbatim.
pub const CONVERSION_PROMPT_TEMPLATE: &str = "Please act as an expert technical writer. \
Analyze the following text and convert it into a well-structured Markdown document. \
Your goal is to preserve all key information and the original logical flow, but enhance it \
with clear formatting. Use headings, subheadings, lists (bulleted or numbered), and emphasis \
(bold or italics) where appropriate to improve readability. Do not add any new information \
or commentary. The output should be only the Markdown content.\n\n---\n\n{{content}}";

/// Template engine wrapper
pub struct TemplateEngine {
    handlebars: Handlebars<'static>,
}

impl TemplateEngine {
    /// Engine that HTML-escapes every `{{value}}`; used for views
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }

    /// Engine that substitutes values untouched; used for prompts
    pub fn plain() -> Self {
        let mut engine = Self::new();
        engine.handlebars.register_escape_fn(handlebars::no_escape);
        engine
    }

    /// Register a named template
    pub fn register_template(&mut self, name: &str, template: &str) -> Result<()> {
        self.handlebars
            .register_template_string(name, template)
            .map_err(|e| ConvHubError::template(e.to_string()))
    }

    /// Render a registered template
    pub fn render_named<T: Serialize>(&self, name: &str, data: &T) -> Result<String> {
        self.handlebars
            .render(name, data)
            .map_err(|e| ConvHubError::template(e.to_string()))
    }

    /// Render an ad-hoc template
    pub fn render<T: Serialize>(&self, template: &str, data: &T) -> Result<String> {
        self.handlebars
            .render_template(template, data)
            .map_err(|e| ConvHubError::template(e.to_string()))
    }
}

impl Default for TemplateEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the conversion prompt for `content`
pub fn compose_conversion_prompt(content: &str) -> Result<String> {
    TemplateEngine::plain().render(
        CONVERSION_PROMPT_TEMPLATE,
        &serde_json::json!({ "content": content }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversion_prompt_embeds_content_verbatim() {
        let content = "a < b && \"quoted\" {{not a var}}\n- item";
        let prompt = compose_conversion_prompt(content).unwrap();
        assert!(prompt.starts_with("Please act as an expert technical writer."));
        assert!(prompt.ends_with(&format!("\n\n---\n\n{}", content)));
    }

    #[test]
    fn test_view_engine_escapes_html() {
        let engine = TemplateEngine::new();
        let out = engine
            .render("<p>{{text}}</p>", &serde_json::json!({"text": "<b>x</b>"}))
            .unwrap();
        assert_eq!(out, "<p>&lt;b&gt;x&lt;/b&gt;</p>");
    }

    #[test]
    fn test_named_templates() {
        let mut engine = TemplateEngine::new();
        engine.register_template("greet", "Hi {{name}}").unwrap();
        let out = engine
            .render_named("greet", &serde_json::json!({"name": "Ada"}))
            .unwrap();
        assert_eq!(out, "Hi Ada");
        assert!(engine.render_named("missing", &()).is_err());
    }
}
