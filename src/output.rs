//! CLI output formatting.
//!
//! # Information-First Display
//!
//! Every entity leads with its positional index and identity (document path,
//! item source), with details on indented context lines:
//!
//! ```text
//! Galleries
//! 001 Pets.md
//!     Line 5: grid, 3 columns (4 items)
//!         001 whiskers.jpg
//!             Tags: cat, cute
//!         002 https://example.com/zoomies.mp4 [video]
//!             Tags: dog, video
//!     Line 14: search for temple (10 per page)
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::document::{Block, BlockKind};
use crate::search::Paginator;
use crate::tags::TagIndex;
use crate::types::{GalleryItem, GallerySettings};
use crate::vault::{DocumentBlocks, FoundItem, ScanReport, TagEditOutcome};

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// Item header: index, source, and flags for non-plain items.
///
/// ```text
/// 001 cat.jpg
/// 002 clip.mp4 [video]
/// 003 ![[dog.png]] [local]
/// ```
fn item_line(index: usize, item: &GalleryItem) -> String {
    let mut flags = Vec::new();
    if item.is_video {
        flags.push("video");
    }
    if item.is_local {
        flags.push("local");
    }
    if flags.is_empty() {
        format!("{} {}", format_index(index), item.source)
    } else {
        format!("{} {} [{}]", format_index(index), item.source, flags.join(", "))
    }
}

fn tags_line(item: &GalleryItem) -> Option<String> {
    (!item.tags.is_empty()).then(|| format!("Tags: {}", item.tags.join(", ")))
}

/// `grid, 3 columns` / `flexbox, 240px rows` / `single`.
fn settings_summary(settings: &GallerySettings) -> String {
    let mut summary = settings.layout.to_string();
    if let Some(columns) = settings.effective_columns() {
        summary.push_str(&format!(", {columns} columns"));
    }
    if let Some(height) = settings.effective_flexbox_height() {
        summary.push_str(&format!(", {height} rows"));
    }
    summary
}

fn plural(n: usize, one: &str, many: &str) -> String {
    if n == 1 {
        format!("{n} {one}")
    } else {
        format!("{n} {many}")
    }
}

// ============================================================================
// scan
// ============================================================================

/// Format every gallery-bearing document with its blocks and items.
pub fn format_scan_output(docs: &[DocumentBlocks], search_page_size: usize) -> Vec<String> {
    let mut lines = vec!["Galleries".to_string()];

    if docs.is_empty() {
        lines.push(format!("{}(no gallery blocks found)", indent(1)));
        return lines;
    }

    for (doc_pos, doc) in docs.iter().enumerate() {
        lines.push(format!("{} {}", format_index(doc_pos + 1), doc.path.display()));
        for block in &doc.blocks {
            lines.extend(format_block(block, search_page_size));
        }
    }

    lines
}

fn format_block(block: &Block, search_page_size: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let place = if block.inline {
        format!("Line {} (inline)", block.line)
    } else {
        format!("Line {}", block.line)
    };

    if block.kind == BlockKind::Search {
        if let Some(query) = block.search_query(search_page_size) {
            let wanted = if query.tags.is_empty() {
                "everything".to_string()
            } else {
                query.tags.join(", ")
            };
            lines.push(format!(
                "{}{place}: search for {wanted} ({} per page)",
                indent(1),
                query.limit
            ));
        }
        return lines;
    }

    let Some(parsed) = block.parse() else {
        lines.push(format!("{}{place}: empty", indent(1)));
        return lines;
    };

    lines.push(format!(
        "{}{place}: {} ({})",
        indent(1),
        settings_summary(&parsed.settings),
        plural(parsed.items.len(), "item", "items")
    ));
    for (pos, item) in parsed.items.iter().enumerate() {
        lines.push(format!("{}{}", indent(2), item_line(pos + 1, item)));
        if let Some(tags) = tags_line(item) {
            lines.push(format!("{}{tags}", indent(3)));
        }
    }
    lines
}

pub fn print_scan_output(docs: &[DocumentBlocks], search_page_size: usize) {
    for line in format_scan_output(docs, search_page_size) {
        println!("{}", line);
    }
}

// ============================================================================
// tags
// ============================================================================

/// Index summary followed by every tag, sorted.
pub fn format_tag_index(index: &TagIndex, report: &ScanReport) -> Vec<String> {
    let mut lines = vec![format!(
        "Tags ({} from {} of {})",
        index.len(),
        plural(report.gallery_documents, "gallery document", "gallery documents"),
        plural(report.documents, "document", "documents"),
    )];

    let mut tags = index.all_tags();
    tags.sort();
    lines.extend(tags.into_iter().map(|t| format!("{}{t}", indent(1))));

    if !report.skipped.is_empty() {
        lines.push("Skipped".to_string());
        lines.extend(
            report
                .skipped
                .iter()
                .map(|p| format!("{}{}", indent(1), p.display())),
        );
    }
    lines
}

pub fn print_tag_index(index: &TagIndex, report: &ScanReport) {
    for line in format_tag_index(index, report) {
        println!("{}", line);
    }
}

// ============================================================================
// suggest
// ============================================================================

/// Suggestion list, marking the highlighted entry with `>`.
pub fn format_suggestions(suggestions: &[String], selected: Option<usize>) -> Vec<String> {
    if suggestions.is_empty() {
        return vec!["(no suggestions)".to_string()];
    }
    suggestions
        .iter()
        .enumerate()
        .map(|(i, tag)| {
            let marker = if selected == Some(i) { ">" } else { " " };
            format!("{marker} {tag}")
        })
        .collect()
}

pub fn print_suggestions(suggestions: &[String], selected: Option<usize>) {
    for line in format_suggestions(suggestions, selected) {
        println!("{}", line);
    }
}

// ============================================================================
// search
// ============================================================================

/// One page of search results with its pagination footer.
pub fn format_search_page(pages: &Paginator<'_, FoundItem>) -> Vec<String> {
    let items = pages.page_items();
    if items.is_empty() {
        return vec!["No matching items".to_string()];
    }

    let mut lines = Vec::new();
    for (pos, found) in items.iter().enumerate() {
        lines.push(item_line(pos + 1, &found.item));
        lines.push(format!(
            "{}Source: {}:{}",
            indent(1),
            found.document.display(),
            found.line
        ));
        if let Some(tags) = tags_line(&found.item) {
            lines.push(format!("{}{tags}", indent(1)));
        }
    }

    let mut footer = pages.label();
    if pages.has_previous() {
        footer.push_str(" [previous]");
    }
    if pages.has_next() {
        footer.push_str(" [next]");
    }
    lines.push(footer);
    lines
}

pub fn print_search_page(pages: &Paginator<'_, FoundItem>) {
    for line in format_search_page(pages) {
        println!("{}", line);
    }
}

// ============================================================================
// tag
// ============================================================================

/// Result of a tag edit, including index changes and write status.
pub fn format_tag_edit(outcome: &TagEditOutcome) -> Vec<String> {
    let mut lines = vec![item_line(1, &outcome.item)];
    lines.push(format!(
        "{}{}",
        indent(1),
        tags_line(&outcome.item).unwrap_or_else(|| "Tags: (none)".to_string())
    ));
    let summary = &outcome.summary;
    if !summary.added.is_empty() {
        lines.push(format!("{}New in index: {}", indent(1), summary.added.join(", ")));
    }
    if !summary.removed.is_empty() {
        lines.push(format!("{}Removed from index: {}", indent(1), summary.removed.join(", ")));
    }
    if !summary.retained.is_empty() {
        lines.push(format!(
            "{}Still used elsewhere: {}",
            indent(1),
            summary.retained.join(", ")
        ));
    }
    if !outcome.persisted {
        lines.push(format!("{}Document NOT updated (see log)", indent(1)));
    }
    lines
}

pub fn print_tag_edit(outcome: &TagEditOutcome) {
    for line in format_tag_edit(outcome) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MarkersConfig;
    use crate::document::find_blocks;
    use crate::markup::parse_item_line;
    use crate::search::SearchQuery;
    use crate::tags::TagEditSummary;
    use std::path::PathBuf;

    fn doc(path: &str, text: &str) -> DocumentBlocks {
        DocumentBlocks {
            path: PathBuf::from(path),
            blocks: find_blocks(text, &MarkersConfig::default()),
        }
    }

    fn found(source_line: &str, line: usize) -> FoundItem {
        FoundItem {
            document: PathBuf::from("Pets.md"),
            line,
            item: parse_item_line(source_line).unwrap(),
        }
    }

    #[test]
    fn item_line_flags() {
        let plain = parse_item_line("a.jpg").unwrap();
        assert_eq!(item_line(1, &plain), "001 a.jpg");
        let video = parse_item_line("b.mp4").unwrap();
        assert_eq!(item_line(2, &video), "002 b.mp4 [video]");
        let local = parse_item_line("![[c.png]]").unwrap();
        assert_eq!(item_line(3, &local), "003 ![[c.png]] [local]");
    }

    #[test]
    fn scan_output_lists_blocks_and_items() {
        let docs = [doc(
            "Pets.md",
            "```galleryx\nsettings: grid\ncolumns: 3\na.jpg {Cat}\nb.jpg\n```\n",
        )];
        let lines = format_scan_output(&docs, 50);
        assert_eq!(
            lines,
            vec![
                "Galleries",
                "001 Pets.md",
                "    Line 1: grid, 3 columns (2 items)",
                "        001 a.jpg",
                "            Tags: cat",
                "        002 b.jpg",
            ]
        );
    }

    #[test]
    fn scan_output_search_and_inline() {
        let docs = [doc(
            "Japan.md",
            "`galleryx-single: a.jpg`\n\n```galleryx-search\ntags: temple\n```\n",
        )];
        let lines = format_scan_output(&docs, 50);
        assert_eq!(lines[2], "    Line 1 (inline): single (1 item)");
        assert_eq!(lines[4], "    Line 3: search for temple (50 per page)");
    }

    #[test]
    fn scan_output_empty() {
        let lines = format_scan_output(&[], 50);
        assert_eq!(lines, vec!["Galleries", "    (no gallery blocks found)"]);
    }

    #[test]
    fn flexbox_height_in_summary() {
        let docs = [doc("a.md", "```galleryx\nflexboxheight: 240px\na.jpg\n```\n")];
        let lines = format_scan_output(&docs, 50);
        assert_eq!(lines[2], "    Line 1: flexbox, 240px rows (1 item)");
    }

    #[test]
    fn tag_index_sorted_with_counts() {
        let index: TagIndex = ["zebra", "apple"].into_iter().collect();
        let report = ScanReport {
            documents: 3,
            gallery_documents: 1,
            new_tags: 2,
            skipped: vec![],
        };
        let lines = format_tag_index(&index, &report);
        assert_eq!(
            lines,
            vec![
                "Tags (2 from 1 gallery document of 3 documents)",
                "    apple",
                "    zebra",
            ]
        );
    }

    #[test]
    fn suggestions_mark_selection() {
        let list = vec!["animal".to_string(), "anime".to_string()];
        assert_eq!(
            format_suggestions(&list, Some(1)),
            vec!["  animal", "> anime"]
        );
        assert_eq!(format_suggestions(&[], None), vec!["(no suggestions)"]);
    }

    #[test]
    fn search_page_with_footer() {
        let results = vec![found("a.jpg {cat}", 5), found("b.jpg {cat}", 5)];
        let mut pages = Paginator::new(&results, 1);
        pages.next_page();
        let lines = format_search_page(&pages);
        assert_eq!(
            lines,
            vec![
                "001 b.jpg",
                "    Source: Pets.md:5",
                "    Tags: cat",
                "Page 2 of 2 [previous]",
            ]
        );
        assert!(SearchQuery::from_input("cat", 1).matches(&results[0].item));
    }

    #[test]
    fn search_page_empty() {
        let results: Vec<FoundItem> = vec![];
        let pages = Paginator::new(&results, 10);
        assert_eq!(format_search_page(&pages), vec!["No matching items"]);
    }

    #[test]
    fn tag_edit_reports_unpersisted() {
        let outcome = TagEditOutcome {
            item: parse_item_line("a.jpg {new}").unwrap(),
            summary: TagEditSummary {
                added: vec!["new".into()],
                removed: vec!["old".into()],
                retained: vec![],
            },
            persisted: false,
        };
        let lines = format_tag_edit(&outcome);
        assert_eq!(
            lines,
            vec![
                "001 a.jpg",
                "    Tags: new",
                "    New in index: new",
                "    Removed from index: old",
                "    Document NOT updated (see log)",
            ]
        );
    }
}
