//! Downloadable files produced from the preview

use crate::render::MindMap;

/// File name of the Markdown download
pub const MARKDOWN_FILE_NAME: &str = "conversion-result.md";

/// Content type of the Markdown download
pub const MARKDOWN_CONTENT_TYPE: &str = "text/markdown;charset=utf-8";

/// File name of the mind-map download
pub const MIND_MAP_FILE_NAME: &str = "mindmap.svg";

/// Content type of the mind-map download
pub const MIND_MAP_CONTENT_TYPE: &str = "image/svg+xml;charset=utf-8";

/// A file ready to be handed to the browser
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Suggested file name
    pub file_name: &'static str,
    /// MIME type
    pub content_type: &'static str,
    /// File body
    pub bytes: Vec<u8>,
}

impl Artifact {
    /// The preview content, byte for byte
    pub fn markdown(content: &str) -> Self {
        Self {
            file_name: MARKDOWN_FILE_NAME,
            content_type: MARKDOWN_CONTENT_TYPE,
            bytes: content.as_bytes().to_vec(),
        }
    }

    /// The serialized mind-map SVG
    pub fn mind_map(map: &MindMap) -> Self {
        Self {
            file_name: MIND_MAP_FILE_NAME,
            content_type: MIND_MAP_CONTENT_TYPE,
            bytes: map.svg().as_bytes().to_vec(),
        }
    }

    /// `Content-Disposition` value that triggers a download
    pub fn content_disposition(&self) -> String {
        format!("attachment; filename=\"{}\"", self.file_name)
    }
}
