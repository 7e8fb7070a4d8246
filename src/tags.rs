//! The shared vocabulary of tags in use across a vault.
//!
//! One [`TagIndex`] is built at startup and handed by reference to everything
//! that reads or edits tags. It is a best-effort cache, not a source of truth:
//! it is seeded by scanning documents and kept roughly current by applying
//! every tag edit. Members are stored lower-cased, so all lookups ignore case.
//!
//! The index keeps no reverse mapping from tags to items. Deciding whether a
//! tag dropped from one item is still used elsewhere is done by
//! [`TagIndex::apply_edit`] against whatever items the caller passes in.

use crate::types::GalleryItem;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagIndex {
    tags: BTreeSet<String>,
}

/// What [`TagIndex::apply_edit`] changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagEditSummary {
    /// Tags that were not in the index before the edit.
    pub added: Vec<String>,
    /// Tags removed because no peer item references them any more.
    pub removed: Vec<String>,
    /// Dropped from the item but kept because a peer still uses them.
    pub retained: Vec<String>,
}

impl TagIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert `tag` lower-cased. Returns `true` if it was not present.
    pub fn add_tag(&mut self, tag: &str) -> bool {
        self.tags.insert(tag.to_lowercase())
    }

    /// Remove `tag` (case-insensitive). Returns `true` if it was present.
    pub fn remove_tag(&mut self, tag: &str) -> bool {
        self.tags.remove(&tag.to_lowercase())
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_lowercase())
    }

    /// All members. Currently in lexicographic order, but callers that
    /// display tags should not rely on that.
    pub fn all_tags(&self) -> Vec<String> {
        self.tags.iter().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.tags.iter().map(String::as_str)
    }

    pub fn clear(&mut self) {
        self.tags.clear();
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Add every tag of every item.
    pub fn add_items<'a>(&mut self, items: impl IntoIterator<Item = &'a GalleryItem>) {
        for item in items {
            for tag in &item.tags {
                self.add_tag(tag);
            }
        }
    }

    /// Update the index after an item's tags went from `previous` to `next`.
    ///
    /// Every tag in `next` is added. A tag in `previous` but not in `next` is
    /// removed only if none of `peers` still carries it. `peers` is the
    /// caller's notion of "other known items"; if it includes the edited item
    /// itself, that item must already hold `next`.
    pub fn apply_edit(
        &mut self,
        previous: &[String],
        next: &[String],
        peers: &[GalleryItem],
    ) -> TagEditSummary {
        let mut summary = TagEditSummary::default();

        for tag in next {
            if self.add_tag(tag) {
                summary.added.push(tag.to_lowercase());
            }
        }

        let next_lower: BTreeSet<String> = next.iter().map(|t| t.to_lowercase()).collect();
        let dropped: BTreeSet<String> = previous
            .iter()
            .map(|t| t.to_lowercase())
            .filter(|t| !next_lower.contains(t))
            .collect();

        for tag in dropped {
            if peers.iter().any(|item| item.has_tag(&tag)) {
                summary.retained.push(tag);
            } else if self.remove_tag(&tag) {
                summary.removed.push(tag);
            }
        }

        summary
    }
}

impl<S: AsRef<str>> FromIterator<S> for TagIndex {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut index = TagIndex::new();
        index.extend(iter);
        index
    }
}

impl<S: AsRef<str>> Extend<S> for TagIndex {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        for tag in iter {
            self.add_tag(tag.as_ref());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(source: &str, tags: &[&str]) -> GalleryItem {
        GalleryItem {
            source: source.to_string(),
            is_local: false,
            is_video: false,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn strings(tags: &[&str]) -> Vec<String> {
        tags.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn add_then_has_ignores_case() {
        let mut index = TagIndex::new();
        index.add_tag("Foo");
        assert!(index.has_tag("foo"));
        assert!(index.has_tag("FOO"));
    }

    #[test]
    fn remove_ignores_case() {
        let mut index = TagIndex::new();
        index.add_tag("Foo");
        assert!(index.remove_tag("FOO"));
        assert!(!index.has_tag("foo"));
    }

    #[test]
    fn add_is_idempotent() {
        let mut index = TagIndex::new();
        assert!(index.add_tag("cat"));
        assert!(!index.add_tag("CAT"));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn remove_missing_is_noop() {
        let mut index: TagIndex = ["a"].into_iter().collect();
        assert!(!index.remove_tag("b"));
        assert_eq!(index.all_tags(), vec!["a"]);
    }

    #[test]
    fn all_tags_are_lowercase() {
        let index: TagIndex = ["Zebra", "apple", "MANGO"].into_iter().collect();
        let mut all = index.all_tags();
        all.sort();
        assert_eq!(all, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn clear_empties() {
        let mut index: TagIndex = ["a", "b"].into_iter().collect();
        index.clear();
        assert!(index.is_empty());
    }

    #[test]
    fn add_items_collects_every_tag() {
        let mut index = TagIndex::new();
        index.add_items(&[item("a.jpg", &["x", "y"]), item("b.jpg", &["y", "z"])]);
        assert_eq!(index.len(), 3);
    }

    // =========================================================================
    // apply_edit
    // =========================================================================

    #[test]
    fn edit_adds_new_tags() {
        let mut index = TagIndex::new();
        let summary = index.apply_edit(&[], &strings(&["Cat", "pet"]), &[]);
        assert!(index.has_tag("cat"));
        assert_eq!(summary.added, vec!["cat", "pet"]);
    }

    #[test]
    fn edit_removes_unreferenced_tag() {
        let mut index: TagIndex = ["cat", "old"].into_iter().collect();
        let peers = [item("b.jpg", &["cat"])];
        let summary = index.apply_edit(&strings(&["cat", "old"]), &strings(&["cat"]), &peers);
        assert!(!index.has_tag("old"));
        assert_eq!(summary.removed, vec!["old"]);
    }

    #[test]
    fn edit_keeps_tag_still_used_by_peer() {
        let mut index: TagIndex = ["cat", "shared"].into_iter().collect();
        let peers = [item("b.jpg", &["shared"])];
        let summary = index.apply_edit(&strings(&["shared"]), &strings(&["cat"]), &peers);
        assert!(index.has_tag("shared"));
        assert_eq!(summary.retained, vec!["shared"]);
        assert!(summary.removed.is_empty());
    }

    #[test]
    fn edit_with_case_change_keeps_tag() {
        let mut index: TagIndex = ["cat"].into_iter().collect();
        index.apply_edit(&strings(&["cat"]), &strings(&["CAT"]), &[]);
        assert!(index.has_tag("cat"));
    }

    #[test]
    fn edit_peer_check_ignores_case() {
        let mut index: TagIndex = ["dog"].into_iter().collect();
        let peers = [item("b.jpg", &["Dog"])];
        index.apply_edit(&strings(&["dog"]), &[], &peers);
        assert!(index.has_tag("dog"));
    }
}
