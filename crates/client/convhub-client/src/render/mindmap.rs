/*!
# Mind Map

Builds a tree from Markdown structure and lays it out as a left-to-right SVG.

Headings nest by level; list items nest under the nearest preceding heading
and under their parent item. A document with exactly one top-level node uses
it as the root; otherwise an unlabeled root holds the top-level nodes.
*/

use handlebars::html_escape;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use serde::Serialize;
use std::fmt::Write;

const ROW_HEIGHT: f64 = 32.0;
const COLUMN_GAP: f64 = 48.0;
const PADDING: f64 = 16.0;
const CHAR_WIDTH: f64 = 7.5;
const DOT_RADIUS: f64 = 4.0;
const BRANCH_COLORS: &[&str] = &[
    "#1f77b4", "#ff7f0e", "#2ca02c", "#d62728", "#9467bd", "#8c564b", "#e377c2", "#17becf",
];

/// A node of the mind-map tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MindMapNode {
    /// Label text
    pub content: String,
    /// Child nodes in document order
    pub children: Vec<MindMapNode>,
}

impl MindMapNode {
    /// A leaf labeled `content`
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            children: Vec::new(),
        }
    }

    /// Total number of nodes in this subtree
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(MindMapNode::len).sum::<usize>()
    }

    /// True for an unlabeled node without children
    pub fn is_empty(&self) -> bool {
        self.content.is_empty() && self.children.is_empty()
    }
}

fn heading_rank(level: HeadingLevel) -> usize {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

// Ranks below 7 are headings; list items rank 7 and deeper.
const LIST_RANK_BASE: usize = 6;

struct TreeBuilder {
    // (rank, node); index 0 is the root
    stack: Vec<(usize, MindMapNode)>,
    capturing: bool,
}

impl TreeBuilder {
    fn new() -> Self {
        Self {
            stack: vec![(0, MindMapNode::default())],
            capturing: false,
        }
    }

    fn close_top(&mut self) {
        if self.stack.len() > 1 {
            if let Some((_, node)) = self.stack.pop() {
                if let Some((_, parent)) = self.stack.last_mut() {
                    parent.children.push(node);
                }
            }
        }
    }

    fn open(&mut self, rank: usize) {
        while self.stack.len() > 1 && self.stack.last().is_some_and(|(r, _)| *r >= rank) {
            self.close_top();
        }
        self.stack.push((rank, MindMapNode::default()));
        self.capturing = true;
    }

    fn push_text(&mut self, text: &str) {
        if !self.capturing {
            return;
        }
        if let Some((_, node)) = self.stack.last_mut() {
            node.content.push_str(text);
        }
    }

    fn stop_capture(&mut self) {
        if let Some((_, node)) = self.stack.last_mut() {
            let trimmed = node.content.trim();
            if trimmed.len() != node.content.len() {
                node.content = trimmed.to_string();
            }
        }
        self.capturing = false;
    }

    fn finish(mut self) -> MindMapNode {
        while self.stack.len() > 1 {
            self.close_top();
        }
        let mut root = self.stack.pop().map(|(_, node)| node).unwrap_or_default();
        if root.children.len() == 1 {
            root.children.remove(0)
        } else {
            root
        }
    }
}

/// Build the mind-map tree for `markdown`
pub fn transform(markdown: &str) -> MindMapNode {
    let mut builder = TreeBuilder::new();
    let mut list_depth = 0usize;

    for event in Parser::new_ext(markdown, pulldown_cmark::Options::ENABLE_STRIKETHROUGH) {
        match event {
            Event::Start(Tag::Heading { level, .. }) => builder.open(heading_rank(level)),
            Event::End(TagEnd::Heading(_)) => builder.stop_capture(),
            Event::Start(Tag::List(_)) => {
                if list_depth > 0 {
                    builder.stop_capture();
                }
                list_depth += 1;
            }
            Event::End(TagEnd::List(_)) => list_depth = list_depth.saturating_sub(1),
            Event::Start(Tag::Item) => builder.open(LIST_RANK_BASE + list_depth),
            Event::End(TagEnd::Item) => builder.stop_capture(),
            Event::Start(Tag::Paragraph) => builder.push_text(" "),
            Event::Text(text) | Event::Code(text) => builder.push_text(&text),
            Event::SoftBreak | Event::HardBreak => builder.push_text(" "),
            _ => {}
        }
    }

    builder.finish()
}

struct PlacedNode {
    label: String,
    depth: usize,
    y: f64,
    parent: Option<usize>,
    branch: usize,
}

fn place(
    node: &MindMapNode,
    depth: usize,
    parent: Option<usize>,
    branch: usize,
    next_row: &mut usize,
    out: &mut Vec<PlacedNode>,
) -> f64 {
    let index = out.len();
    out.push(PlacedNode {
        label: node.content.clone(),
        depth,
        y: 0.0,
        parent,
        branch,
    });

    let y = if node.children.is_empty() {
        let y = PADDING + ROW_HEIGHT * (*next_row as f64) + ROW_HEIGHT / 2.0;
        *next_row += 1;
        y
    } else {
        let ys: Vec<f64> = node
            .children
            .iter()
            .enumerate()
            .map(|(i, child)| {
                let child_branch = if depth == 0 { i } else { branch };
                place(child, depth + 1, Some(index), child_branch, next_row, out)
            })
            .collect();
        let first = ys.first().copied().unwrap_or(0.0);
        let last = ys.last().copied().unwrap_or(first);
        (first + last) / 2.0
    };

    out[index].y = y;
    y
}

fn label_width(label: &str) -> f64 {
    label.chars().count() as f64 * CHAR_WIDTH
}

/// Render `root` as a standalone SVG document
pub fn render_svg(root: &MindMapNode) -> String {
    let mut nodes = Vec::with_capacity(root.len());
    let mut rows = 0usize;
    place(root, 0, None, 0, &mut rows, &mut nodes);

    let max_depth = nodes.iter().map(|n| n.depth).max().unwrap_or(0);
    let mut column_widths = vec![0.0f64; max_depth + 1];
    for node in &nodes {
        let w = label_width(&node.label) + DOT_RADIUS * 3.0;
        column_widths[node.depth] = column_widths[node.depth].max(w);
    }
    let mut column_x = Vec::with_capacity(column_widths.len());
    let mut x = PADDING;
    for w in &column_widths {
        column_x.push(x);
        x += w + COLUMN_GAP;
    }

    let width = x - COLUMN_GAP + PADDING;
    let height = PADDING * 2.0 + ROW_HEIGHT * rows.max(1) as f64;

    let mut svg = String::new();
    let _ = write!(
        svg,
        r#"<svg xmlns="http://www.w3.org/2000/svg" class="mindmap" width="{w:.0}" height="{h:.0}" viewBox="0 0 {w:.0} {h:.0}">"#,
        w = width,
        h = height
    );
    svg.push_str(
        "<style>text{font:13px sans-serif;fill:#333;dominant-baseline:middle}\
         path{fill:none;stroke-width:1.5}</style>",
    );

    for node in &nodes {
        if let Some(parent) = node.parent.map(|p| &nodes[p]) {
            let x1 = column_x[parent.depth] + DOT_RADIUS * 3.0 + label_width(&parent.label);
            let x2 = column_x[node.depth] - DOT_RADIUS;
            let mid = (x1 + x2) / 2.0;
            let _ = write!(
                svg,
                r#"<path d="M{x1:.1},{y1:.1} C{mid:.1},{y1:.1} {mid:.1},{y2:.1} {x2:.1},{y2:.1}" stroke="{color}"/>"#,
                y1 = parent.y,
                y2 = node.y,
                color = BRANCH_COLORS[node.branch % BRANCH_COLORS.len()]
            );
        }
    }

    for node in &nodes {
        let x = column_x[node.depth];
        let color = BRANCH_COLORS[node.branch % BRANCH_COLORS.len()];
        let _ = write!(
            svg,
            r#"<g class="node"><circle cx="{x:.1}" cy="{y:.1}" r="{r}" fill="{color}"/><text x="{tx:.1}" y="{y:.1}">{label}</text></g>"#,
            y = node.y,
            r = DOT_RADIUS,
            tx = x + DOT_RADIUS * 2.0,
            label = html_escape(&node.label)
        );
    }

    svg.push_str("</svg>");
    svg
}

/// A rendered mind map that can be updated in place
#[derive(Debug, Clone)]
pub struct MindMap {
    root: MindMapNode,
    svg: String,
    revision: u64,
}

impl MindMap {
    /// Render `root` for the first time
    pub fn create(root: MindMapNode) -> Self {
        let svg = render_svg(&root);
        Self {
            root,
            svg,
            revision: 0,
        }
    }

    /// Replace the tree and re-render
    pub fn set_data(&mut self, root: MindMapNode) {
        if root == self.root {
            return;
        }
        self.svg = render_svg(&root);
        self.root = root;
        self.revision += 1;
    }

    /// Current tree
    pub fn root(&self) -> &MindMapNode {
        &self.root
    }

    /// Current SVG document
    pub fn svg(&self) -> &str {
        &self.svg
    }

    /// Number of times the tree has been replaced
    pub fn revision(&self) -> u64 {
        self.revision
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(node: &MindMapNode) -> Vec<&str> {
        node.children.iter().map(|c| c.content.as_str()).collect()
    }

    #[test]
    fn test_single_heading_becomes_root() {
        let root = transform("# Title\n\n## A\n\n- a1\n- a2\n  - a2x\n\n## B\n\ntext\n");
        assert_eq!(root.content, "Title");
        assert_eq!(labels(&root), ["A", "B"]);
        assert_eq!(labels(&root.children[0]), ["a1", "a2"]);
        assert_eq!(labels(&root.children[0].children[1]), ["a2x"]);
        assert!(root.children[1].children.is_empty());
    }

    #[test]
    fn test_multiple_top_level_nodes_get_unlabeled_root() {
        let root = transform("# One\n# Two\n");
        assert_eq!(root.content, "");
        assert_eq!(labels(&root), ["One", "Two"]);
    }

    #[test]
    fn test_skipped_levels_and_inline_markup() {
        let root = transform("# T\n### Deep `code` and **bold**\n## Back\n");
        assert_eq!(labels(&root), ["Deep code and bold", "Back"]);
    }

    #[test]
    fn test_plain_text_yields_empty_tree() {
        let root = transform("just a paragraph");
        assert!(root.is_empty());
        assert_eq!(root.len(), 1);
    }

    #[test]
    fn test_svg_escapes_labels() {
        let svg = render_svg(&transform("# a < b & c"));
        assert!(svg.starts_with("<svg xmlns=\"http://www.w3.org/2000/svg\""));
        assert!(svg.contains("a &lt; b &amp; c"));
        assert!(svg.ends_with("</svg>"));

        let svg = render_svg(&transform("# it's \"x\""));
        assert!(svg.contains("it&#x27;s &quot;x&quot;"));
    }

    #[test]
    fn test_svg_has_node_and_edge_per_child() {
        let svg = render_svg(&transform("# R\n- x\n- y\n"));
        assert_eq!(svg.matches("<g class=\"node\">").count(), 3);
        assert_eq!(svg.matches("<path ").count(), 2);
    }

    #[test]
    fn test_set_data_updates_in_place() {
        let mut map = MindMap::create(transform("# A"));
        let first = map.svg().to_string();

        map.set_data(transform("# A"));
        assert_eq!(map.revision(), 0);

        map.set_data(transform("# B\n- c"));
        assert_eq!(map.revision(), 1);
        assert_eq!(map.root().content, "B");
        assert_ne!(map.svg(), first);
    }
}
