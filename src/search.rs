//! Tag search over gallery items.
//!
//! A search block asks for every item in the vault carrying a set of tags:
//!
//! ```text
//! tags: cat, outdoor
//! limit: 20
//! ```
//!
//! `tags:` is the comma-separated query and `limit:` the page size (50 when
//! absent, zero or unparsable). An item matches when **every** query tag is a
//! case-insensitive substring of at least one of its tags, so `cat` finds
//! items tagged `cats` or `bobcat`.
//!
//! Results are shown a page at a time with a [`Paginator`], rendered with the
//! settings from [`results_settings`].

use crate::types::{GalleryItem, GallerySettings, LayoutKind};

pub const DEFAULT_PAGE_SIZE: usize = 50;
pub const DEFAULT_RESULTS_HEIGHT: &str = "295px";

/// A parsed search block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    /// Lower-cased, trimmed query tags.
    pub tags: Vec<String>,
    pub limit: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            tags: Vec::new(),
            limit: DEFAULT_PAGE_SIZE,
        }
    }
}

impl SearchQuery {
    /// Build a query from free text typed into a search field.
    pub fn from_input(input: &str, limit: usize) -> Self {
        Self {
            tags: parse_query_tags(input),
            limit: if limit == 0 { DEFAULT_PAGE_SIZE } else { limit },
        }
    }

    pub fn matches(&self, item: &GalleryItem) -> bool {
        item_matches_tags(item, &self.tags)
    }

    /// Matching items, in input order.
    pub fn filter<'a>(&self, items: &'a [GalleryItem]) -> Vec<&'a GalleryItem> {
        items.iter().filter(|item| self.matches(item)).collect()
    }
}

/// Parse a search block body. Later lines override earlier ones.
pub fn parse_search_settings<S: AsRef<str>>(lines: &[S], default_limit: usize) -> SearchQuery {
    let mut query = SearchQuery {
        tags: Vec::new(),
        limit: default_limit,
    };

    for line in lines {
        let line = line.as_ref().trim_start();
        if let Some(rest) = line.strip_prefix("tags:") {
            query.tags = parse_query_tags(rest);
        } else if let Some(rest) = line.strip_prefix("limit:") {
            query.limit = match rest.trim().parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => default_limit,
            };
        }
    }

    query
}

fn parse_query_tags(list: &str) -> Vec<String> {
    list.split(',')
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .collect()
}

/// Whether every query tag is contained in at least one of the item's tags.
///
/// An empty query matches everything.
pub fn item_matches_tags(item: &GalleryItem, query: &[String]) -> bool {
    query.iter().all(|wanted| {
        let wanted = wanted.to_lowercase();
        item.tags
            .iter()
            .any(|tag| tag.to_lowercase().contains(&wanted))
    })
}

/// Settings used to render a page of search results.
pub fn results_settings(height: &str) -> GallerySettings {
    GallerySettings {
        layout: LayoutKind::Flexbox,
        flexbox_height: Some(height.to_string()),
        columns: None,
    }
}

/// Fixed-size pages over a result list. Pages are 1-based.
#[derive(Debug, Clone)]
pub struct Paginator<'a, T> {
    items: &'a [T],
    page_size: usize,
    current: usize,
}

impl<'a, T> Paginator<'a, T> {
    pub fn new(items: &'a [T], page_size: usize) -> Self {
        Self {
            items,
            page_size: page_size.max(1),
            current: 1,
        }
    }

    pub fn total_pages(&self) -> usize {
        self.items.len().div_ceil(self.page_size)
    }

    pub fn current_page(&self) -> usize {
        self.current
    }

    /// Items on the current page.
    pub fn page_items(&self) -> &'a [T] {
        let start = (self.current - 1) * self.page_size;
        if start >= self.items.len() {
            return &[];
        }
        let end = (start + self.page_size).min(self.items.len());
        &self.items[start..end]
    }

    pub fn has_previous(&self) -> bool {
        self.current > 1
    }

    pub fn has_next(&self) -> bool {
        self.current < self.total_pages()
    }

    /// Advance one page. Returns `false` on the last page.
    pub fn next_page(&mut self) -> bool {
        if self.has_next() {
            self.current += 1;
            true
        } else {
            false
        }
    }

    /// Go back one page. Returns `false` on the first page.
    pub fn previous_page(&mut self) -> bool {
        if self.has_previous() {
            self.current -= 1;
            true
        } else {
            false
        }
    }

    /// Jump to `page`, clamped to the valid range.
    pub fn go_to(&mut self, page: usize) {
        self.current = page.clamp(1, self.total_pages().max(1));
    }

    /// `"Page 2 of 5"`.
    pub fn label(&self) -> String {
        format!("Page {} of {}", self.current, self.total_pages())
    }
}
