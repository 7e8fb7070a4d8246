//! Gallery markup parser.
//!
//! Turns the body of a gallery block into [`GallerySettings`] and a list of
//! [`GalleryItem`]s. Pure and deterministic: no I/O, no hidden state, the same
//! lines always give the same result.
//!
//! ## Block Format
//!
//! ```text
//! settings: grid                          ← optional setting lines, leading only
//! columns: 3
//! https://example.com/cat.jpg {Cat, Pets}  ← one item per line
//! ![[clips/run.mp4]] {sport}
//! images/dog.png
//! ```
//!
//! Setting lines are recognised only at the top of the block. The first line
//! that is not a setting ends the scan and everything from there on is an
//! item line, even if it looks like a setting.
//!
//! ## Item Lines
//!
//! A line splits on its first `{`. The left side, trimmed, is the source. The
//! right side is the tag group: it runs up to the first `}` (or the end of the
//! line when there is none), splits on `,`, and each piece is trimmed and
//! lower-cased. Empty pieces are dropped, so `cat.jpg {}` has no tags and
//! `cat.jpg {a,,b}` has two. Lines whose source trims to nothing are dropped.
//!
//! Nothing here reports errors: malformed setting values leave the field as it
//! was, and unusable item lines are filtered out.

use crate::source::{is_video_path, parse_source};
use crate::types::{GalleryItem, GallerySettings, LayoutKind};
use serde::Serialize;

const SETTINGS_PREFIX: &str = "settings:";
const FLEXBOX_HEIGHT_PREFIX: &str = "flexboxheight:";
const COLUMNS_PREFIX: &str = "columns:";

/// Settings parsed from the leading lines of a block.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedSettings {
    pub settings: GallerySettings,
    /// Index of the first line that is not a setting line.
    pub content_start: usize,
}

/// A fully parsed block: settings plus items.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedBlock {
    pub settings: GallerySettings,
    pub items: Vec<GalleryItem>,
}

/// Scan the leading setting lines of a block.
///
/// Stops at the first line whose trimmed text does not start with
/// `settings:`, `flexboxheight:` or `columns:`.
pub fn extract_settings<S: AsRef<str>>(lines: &[S]) -> ExtractedSettings {
    let mut settings = GallerySettings::default();
    let mut content_start = 0;

    for line in lines {
        if !apply_setting_line(&mut settings, line.as_ref().trim()) {
            break;
        }
        content_start += 1;
    }

    ExtractedSettings {
        settings,
        content_start,
    }
}

/// Merge one trimmed line into `settings`.
///
/// Returns `false` when the line carries no recognised prefix. A recognised
/// prefix with an unusable value still counts as a setting line.
fn apply_setting_line(settings: &mut GallerySettings, line: &str) -> bool {
    if let Some(rest) = line.strip_prefix(SETTINGS_PREFIX) {
        let token = leading_word(rest.trim_start());
        if !token.is_empty() {
            settings.layout = LayoutKind::from_token(token);
        }
        true
    } else if let Some(rest) = line.strip_prefix(FLEXBOX_HEIGHT_PREFIX) {
        if let Some(height) = parse_px_length(rest.trim_start()) {
            settings.flexbox_height = Some(height.to_string());
        }
        true
    } else if let Some(rest) = line.strip_prefix(COLUMNS_PREFIX) {
        let digits = leading_digits(rest.trim_start());
        if let Ok(columns) = digits.parse::<u32>() {
            settings.columns = Some(columns);
        }
        true
    } else {
        false
    }
}

/// Leading run of ASCII letters, digits and underscores.
fn leading_word(s: &str) -> &str {
    let end = s
        .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
        .unwrap_or(s.len());
    &s[..end]
}

fn leading_digits(s: &str) -> &str {
    let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    &s[..end]
}

/// Match `<digits>px` at the start of `s`, returning the matched slice.
pub(crate) fn parse_px_length(s: &str) -> Option<&str> {
    let digits = leading_digits(s);
    if digits.is_empty() || !s[digits.len()..].starts_with("px") {
        return None;
    }
    Some(&s[..digits.len() + 2])
}

/// Parse item lines into gallery items, dropping lines with an empty source.
pub fn parse_gallery_items<S: AsRef<str>>(lines: &[S]) -> Vec<GalleryItem> {
    lines
        .iter()
        .filter_map(|line| parse_item_line(line.as_ref()))
        .collect()
}

/// Parse a single item line. `None` when the source part trims to nothing.
pub fn parse_item_line(line: &str) -> Option<GalleryItem> {
    let (source_part, tags_part) = match line.split_once('{') {
        Some((source, tags)) => (source, Some(tags)),
        None => (line, None),
    };

    let source = source_part.trim();
    if source.is_empty() {
        return None;
    }

    let parsed = parse_source(source);
    Some(GalleryItem {
        source: source.to_string(),
        is_local: parsed.is_local,
        is_video: is_video_path(source),
        tags: tags_part.map(parse_tag_group).unwrap_or_default(),
    })
}

/// Parse the text after an item's `{` into normalized tags.
fn parse_tag_group(group: &str) -> Vec<String> {
    let body = match group.split_once('}') {
        Some((body, _)) => body,
        None => group,
    };
    split_tags(body)
}

/// Split a comma-separated tag list, trimming and lower-casing each piece.
/// Empty pieces are dropped.
pub fn split_tags(list: &str) -> Vec<String> {
    list.split(',')
        .map(|piece| piece.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Parse a whole block body: leading settings, then items.
pub fn parse_block<S: AsRef<str>>(lines: &[S]) -> ParsedBlock {
    let ExtractedSettings {
        settings,
        content_start,
    } = extract_settings(lines);
    ParsedBlock {
        settings,
        items: parse_gallery_items(&lines[content_start..]),
    }
}

/// Parse a block body given as one string.
pub fn parse_block_text(body: &str) -> ParsedBlock {
    let lines: Vec<&str> = body.lines().collect();
    parse_block(&lines)
}

/// Parse a single-item block or inline marker body.
///
/// Only the first item is kept and the layout is always `single`.
pub fn parse_single(body: &str) -> Option<ParsedBlock> {
    let item = body.lines().find_map(parse_item_line)?;
    Some(ParsedBlock {
        settings: GallerySettings::with_layout(LayoutKind::Single),
        items: vec![item],
    })
}
