//! Renderers for the result preview

pub mod markdown;
pub mod mindmap;

pub use markdown::{GfmRenderer, MarkdownRenderer};
pub use mindmap::{transform, MindMap, MindMapNode};
