//! Block tree over a Markdown document, built from pulldown-cmark's offset
//! iterator.
//!
//! Only the block structure matters for task extraction, so inline markup is
//! folded into the byte range of the block that holds it. Ranges are
//! normalized: leading indentation and trailing whitespace are trimmed, so a
//! list item starts on its bullet and ends on its last non-blank byte. Tight
//! list items carry their text without a paragraph event; those inline runs
//! are wrapped in a synthetic [`NodeKind::Paragraph`] so every task-shaped
//! item looks the same regardless of list looseness.

use std::ops::Range;

use pulldown_cmark::{Event, Options, Parser, Tag, TagEnd};

use crate::error::ParseError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    List,
    Item,
    Paragraph,
    /// YAML front matter; never holds tasks.
    Metadata,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub kind: NodeKind,
    pub range: Range<usize>,
    pub children: Vec<Node>,
}

impl Node {
    fn new(kind: NodeKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            children: Vec::new(),
        }
    }
}

fn block_kind(tag: &Tag<'_>) -> NodeKind {
    match tag {
        Tag::List(_) => NodeKind::List,
        Tag::Item => NodeKind::Item,
        Tag::Paragraph => NodeKind::Paragraph,
        Tag::MetadataBlock(_) => NodeKind::Metadata,
        _ => NodeKind::Other,
    }
}

fn is_inline(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Emphasis | Tag::Strong | Tag::Strikethrough | Tag::Link { .. } | Tag::Image { .. }
    )
}

fn is_inline_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link | TagEnd::Image
    )
}

fn normalize(text: &str, range: Range<usize>) -> Range<usize> {
    let bytes = text.as_bytes();
    let mut start = range.start.min(bytes.len());
    let mut end = range.end.min(bytes.len());

    while start < end && matches!(bytes[start], b' ' | b'\t') {
        start += 1;
    }
    while end > start && bytes[end - 1].is_ascii_whitespace() {
        end -= 1;
    }
    start..end
}

struct TreeBuilder<'a> {
    text: &'a str,
    stack: Vec<Node>,
    /// Pending inline run directly inside the node on top of the stack.
    run: Option<Range<usize>>,
    inline_depth: usize,
}

impl<'a> TreeBuilder<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            stack: vec![Node::new(NodeKind::Document, 0..text.len())],
            run: None,
            inline_depth: 0,
        }
    }

    fn top_kind(&self) -> NodeKind {
        self.stack
            .last()
            .map(|n| n.kind)
            .unwrap_or(NodeKind::Document)
    }

    fn extend_run(&mut self, range: Range<usize>) {
        if self.top_kind() != NodeKind::Item {
            return;
        }
        self.run = Some(match self.run.take() {
            Some(run) => run.start.min(range.start)..run.end.max(range.end),
            None => range,
        });
    }

    fn flush_run(&mut self) {
        let Some(run) = self.run.take() else {
            return;
        };
        let range = normalize(self.text, run);
        if range.is_empty() {
            return;
        }
        if let Some(top) = self.stack.last_mut() {
            top.children.push(Node::new(NodeKind::Paragraph, range));
        }
    }

    fn open(&mut self, kind: NodeKind, range: Range<usize>) {
        self.flush_run();
        self.stack.push(Node::new(kind, range));
    }

    fn close(&mut self) -> Result<(), ParseError> {
        self.flush_run();
        if self.stack.len() < 2 {
            return Err(ParseError::Structure("unbalanced end event".into()));
        }
        let mut node = self
            .stack
            .pop()
            .ok_or_else(|| ParseError::Structure("empty node stack".into()))?;
        node.range = normalize(self.text, node.range);
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
        Ok(())
    }

    fn leaf(&mut self, kind: NodeKind, range: Range<usize>) {
        self.flush_run();
        let range = normalize(self.text, range);
        if let Some(top) = self.stack.last_mut() {
            top.children.push(Node::new(kind, range));
        }
    }

    fn finish(mut self) -> Result<Node, ParseError> {
        self.flush_run();
        if self.stack.len() != 1 {
            return Err(ParseError::Structure(format!(
                "{} block(s) left open at end of document",
                self.stack.len() - 1
            )));
        }
        self.stack
            .pop()
            .ok_or_else(|| ParseError::Structure("empty node stack".into()))
    }
}

/// Parse `text` into its block tree.
pub fn parse_blocks(text: &str) -> Result<Node, ParseError> {
    let mut builder = TreeBuilder::new(text);
    let parser = Parser::new_ext(text, Options::ENABLE_YAML_STYLE_METADATA_BLOCKS);

    for (event, range) in parser.into_offset_iter() {
        match event {
            Event::Start(tag) if is_inline(&tag) => {
                if builder.inline_depth == 0 {
                    builder.extend_run(range);
                }
                builder.inline_depth += 1;
            }
            Event::End(tag) if is_inline_end(&tag) => {
                builder.inline_depth = builder.inline_depth.saturating_sub(1);
            }
            _ if builder.inline_depth > 0 => {}
            Event::Start(tag) => builder.open(block_kind(&tag), range),
            Event::End(_) => builder.close()?,
            Event::Rule => builder.leaf(NodeKind::Other, range),
            Event::Text(_)
            | Event::Code(_)
            | Event::Html(_)
            | Event::InlineHtml(_)
            | Event::SoftBreak
            | Event::HardBreak
            | Event::FootnoteReference(_)
            | Event::TaskListMarker(_)
            | Event::InlineMath(_)
            | Event::DisplayMath(_) => builder.extend_run(range),
        }
    }

    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(node: &Node) -> Vec<&Node> {
        let mut out = Vec::new();
        for child in &node.children {
            if child.kind == NodeKind::Item {
                out.push(child);
            }
            out.extend(items(child));
        }
        out
    }

    #[test]
    fn tight_items_get_a_paragraph() {
        let text = "- [ ] Buy milk\n- [x] Finish report\n";
        let root = parse_blocks(text).unwrap();
        let found = items(&root);
        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].range.clone()], "- [ ] Buy milk");
        assert_eq!(found[0].children[0].kind, NodeKind::Paragraph);
        assert_eq!(&text[found[0].children[0].range.clone()], "[ ] Buy milk");
        assert_eq!(&text[found[1].range.clone()], "- [x] Finish report");
    }

    #[test]
    fn nested_item_range_covers_children() {
        let text = "- [ ] Parent\n  - [ ] Child\n";
        let root = parse_blocks(text).unwrap();
        let found = items(&root);
        assert_eq!(found.len(), 2);
        assert_eq!(&text[found[0].range.clone()], "- [ ] Parent\n  - [ ] Child");
        assert_eq!(found[0].children[1].kind, NodeKind::List);
        assert_eq!(&text[found[1].range.clone()], "- [ ] Child");
    }

    #[test]
    fn front_matter_is_a_metadata_block() {
        let text = "---\ntitle: x\n---\n\n- [ ] a\n";
        let root = parse_blocks(text).unwrap();
        assert_eq!(root.children[0].kind, NodeKind::Metadata);
        assert_eq!(items(&root).len(), 1);
    }

    #[test]
    fn empty_document_has_no_children() {
        let root = parse_blocks("").unwrap();
        assert!(root.children.is_empty());
    }
}
