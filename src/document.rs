//! Textual operations on whole Markdown documents.
//!
//! These are the collaborators between the parser and the vault files:
//!
//! - [`find_blocks`]: locate gallery, single-item and search blocks. Uses a
//!   real Markdown parser, so only genuine fenced code blocks and inline code
//!   spans count; a fence inside a quote or list still works, a fence-looking
//!   line inside another code block does not.
//! - [`extract_document_tags`]: the cheap vault-scan pass that seeds the tag
//!   index from every `{...}` group of a document that contains a gallery
//!   marker at all.
//! - [`rewrite_item_tags`]: write an item's new tags back into the text. This
//!   is a first-match line rewrite, not a structural edit: the first line
//!   containing the item's source gets its tag group replaced or appended.

use crate::config::MarkersConfig;
use crate::markup::{self, ParsedBlock, split_tags};
use crate::search::{self, SearchQuery};
use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};

/// Which kind of block a fence or inline marker introduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Settings lines followed by items.
    Gallery,
    /// One item, rendered with the `single` layout.
    Single,
    /// `tags:` / `limit:` lines describing a search.
    Search,
}

/// A block found in a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub kind: BlockKind,
    /// Text between the fences, or after the inline prefix.
    pub body: String,
    /// 1-based line of the opening fence or inline code span.
    pub line: usize,
    /// Found as an inline code span rather than a fenced block.
    pub inline: bool,
}

impl Block {
    /// Parse a gallery or single block. `None` for search blocks and for
    /// single blocks without an item.
    pub fn parse(&self) -> Option<ParsedBlock> {
        match self.kind {
            BlockKind::Gallery => Some(markup::parse_block_text(&self.body)),
            BlockKind::Single => markup::parse_single(&self.body),
            BlockKind::Search => None,
        }
    }

    /// Parse a search block. `None` for other kinds.
    pub fn search_query(&self, default_limit: usize) -> Option<SearchQuery> {
        match self.kind {
            BlockKind::Search => {
                let lines: Vec<&str> = self.body.lines().collect();
                Some(search::parse_search_settings(&lines, default_limit))
            }
            _ => None,
        }
    }
}

/// Find every gallery-related block in `text`, in document order.
pub fn find_blocks(text: &str, markers: &MarkersConfig) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut open: Option<(BlockKind, usize)> = None;
    let mut body = String::new();

    for (event, range) in Parser::new(text).into_offset_iter() {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(info))) => {
                let language = info.split_whitespace().next().unwrap_or_default();
                open = fence_kind(language, markers).map(|kind| (kind, range.start));
                body.clear();
            }
            Event::Text(chunk) if open.is_some() => body.push_str(&chunk),
            Event::End(TagEnd::CodeBlock) => {
                if let Some((kind, start)) = open.take() {
                    blocks.push(Block {
                        kind,
                        body: std::mem::take(&mut body),
                        line: line_of(text, start),
                        inline: false,
                    });
                }
            }
            Event::Code(code) => {
                if let Some(rest) = code.trim().strip_prefix(markers.inline_prefix.as_str()) {
                    blocks.push(Block {
                        kind: BlockKind::Single,
                        body: rest.trim().to_string(),
                        line: line_of(text, range.start),
                        inline: true,
                    });
                }
            }
            _ => {}
        }
    }

    blocks
}

fn fence_kind(language: &str, markers: &MarkersConfig) -> Option<BlockKind> {
    if language == markers.block {
        Some(BlockKind::Gallery)
    } else if language == markers.single_block {
        Some(BlockKind::Single)
    } else if language == markers.search_block {
        Some(BlockKind::Search)
    } else {
        None
    }
}

fn line_of(text: &str, offset: usize) -> usize {
    text[..offset].matches('\n').count() + 1
}

/// Whether `text` contains a gallery fence opening or the inline marker.
///
/// This is a plain substring check used to skip documents cheaply before
/// any parsing.
pub fn has_gallery_marker(text: &str, markers: &MarkersConfig) -> bool {
    ["```", "~~~"]
        .iter()
        .any(|fence| text.contains(&format!("{fence}{}", markers.block)))
        || text.contains(&markers.inline_prefix)
}

/// Tags from every single-line `{...}` group of a document.
///
/// Documents without a gallery marker yield nothing. Tags come back
/// lower-cased and trimmed, empty pieces dropped, in document order with
/// duplicates kept.
pub fn extract_document_tags(text: &str, markers: &MarkersConfig) -> Vec<String> {
    if !has_gallery_marker(text, markers) {
        return Vec::new();
    }
    text.lines().flat_map(line_tag_groups).flat_map(split_tags).collect()
}

/// Contents of each `{...}` group on one line.
fn line_tag_groups(line: &str) -> Vec<&str> {
    let mut groups = Vec::new();
    let mut rest = line;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                groups.push(&after[..close]);
                rest = &after[close + 1..];
            }
            None => break,
        }
    }
    groups
}

/// Replace the tag group of the first line containing `source`.
///
/// Only the `{...}` group after the source changes: from its `{` through the
/// first `}` (or the end of the item when unclosed). Without a group, one is
/// inserted right after the source. When the source sits inside an inline
/// code span the item ends at the closing backtick, so the span and the prose
/// around it survive. An empty `tags` removes the group. Line endings are
/// preserved.
///
/// Returns `None` when no line contains `source` (or `source` is empty).
pub fn rewrite_item_tags(text: &str, source: &str, tags: &[String]) -> Option<String> {
    if source.is_empty() {
        return None;
    }

    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        if let Some(pos) = line.find(source) {
            let (content, ending) = split_line_ending(line);
            let source_end = pos + source.len();
            let tail = &content[source_end..];

            // An odd number of backticks before the source means it is inside
            // an inline code span; the item stops at the closing backtick.
            let in_code_span = content[..pos].matches('`').count() % 2 == 1;
            let item_end = if in_code_span {
                tail.find('`').unwrap_or(tail.len())
            } else {
                tail.len()
            };
            let item_tail = &tail[..item_end];

            let (keep_until, resume_at) = match item_tail.find('{') {
                Some(open) => {
                    let close = item_tail[open..]
                        .find('}')
                        .map_or(item_tail.len(), |c| open + c + 1);
                    (source_end + item_tail[..open].trim_end().len(), source_end + close)
                }
                None => {
                    let end = source_end + item_tail.trim_end().len();
                    (end, end)
                }
            };

            let mut rewritten = String::with_capacity(text.len() + 16);
            rewritten.push_str(&text[..offset]);
            rewritten.push_str(&content[..keep_until]);
            if !tags.is_empty() {
                rewritten.push_str(" {");
                rewritten.push_str(&tags.join(", "));
                rewritten.push('}');
            }
            rewritten.push_str(&content[resume_at..]);
            rewritten.push_str(ending);
            rewritten.push_str(&text[offset + line.len()..]);
            return Some(rewritten);
        }
        offset += line.len();
    }

    None
}

fn split_line_ending(line: &str) -> (&str, &str) {
    if let Some(content) = line.strip_suffix("\r\n") {
        (content, "\r\n")
    } else if let Some(content) = line.strip_suffix('\n') {
        (content, "\n")
    } else {
        (line, "")
    }
}
