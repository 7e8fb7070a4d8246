//! File-backed collaborators: the vault on disk.
//!
//! A vault is a directory of Markdown documents. This module walks it, reads
//! documents, and connects them to the pure modules:
//!
//! - **Index seeding**: [`Vault::populate_index`] reads every document (in
//!   parallel) and adds the tags of each `{...}` group of documents that carry
//!   a gallery marker. [`Vault::refresh_document`] does the same for a single
//!   document after it changed. Both only ever add: a stale tag survives until
//!   an edit removes it.
//! - **Search**: [`Vault::search`] collects items from every gallery block
//!   of every document and keeps those matching a query.
//! - **Tag edits**: [`Vault::edit_item_tags`] updates the item, the index and
//!   the document text. Write failures are logged and reported in the outcome
//!   but never roll back the in-memory state.
//!
//! Unreadable documents are skipped with a warning; a scan never fails
//! because of one bad file.

use crate::config::{self, GalleryConfig};
use crate::document::{self, Block, BlockKind};
use crate::markup::split_tags;
use crate::search::SearchQuery;
use crate::tags::{TagEditSummary, TagIndex};
use crate::types::GalleryItem;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, error, info, warn};
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum VaultError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Directory walk error: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("Vault root is not a directory: {0}")]
    NotADirectory(PathBuf),
    #[error("Document not found: {0}")]
    DocumentNotFound(PathBuf),
    #[error("No gallery item {item:?} in {path}")]
    ItemNotFound { path: PathBuf, item: String },
}

/// Result of seeding a tag index from the whole vault.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanReport {
    /// Documents read successfully.
    pub documents: usize,
    /// Documents that carried a gallery marker.
    pub gallery_documents: usize,
    /// Tags that were new to the index.
    pub new_tags: usize,
    /// Documents that could not be read.
    pub skipped: Vec<PathBuf>,
}

/// The gallery-related blocks of one document.
#[derive(Debug, Clone)]
pub struct DocumentBlocks {
    /// Path relative to the vault root.
    pub path: PathBuf,
    pub blocks: Vec<Block>,
}

/// A search hit with where it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct FoundItem {
    /// Path relative to the vault root.
    pub document: PathBuf,
    /// Line of the block's opening fence.
    pub line: usize,
    pub item: GalleryItem,
}

/// Result of [`Vault::edit_item_tags`].
#[derive(Debug, Clone)]
pub struct TagEditOutcome {
    /// The item with its new tags.
    pub item: GalleryItem,
    /// Index changes.
    pub summary: TagEditSummary,
    /// Whether the document was written. `false` means the in-memory state
    /// and the file now disagree until the next successful edit.
    pub persisted: bool,
}

#[derive(Debug, Clone)]
pub struct Vault {
    root: PathBuf,
    config: GalleryConfig,
}

impl Vault {
    /// Open a vault, loading `galleryx.toml` from its root if present.
    pub fn open(root: &Path) -> Result<Self, VaultError> {
        if !root.is_dir() {
            return Err(VaultError::NotADirectory(root.to_path_buf()));
        }
        let config = config::load_config(root)?;
        Ok(Self::with_config(root, config))
    }

    pub fn with_config(root: &Path, config: GalleryConfig) -> Self {
        Self {
            root: root.to_path_buf(),
            config,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    /// All document paths, absolute, sorted.
    pub fn documents(&self) -> Result<Vec<PathBuf>, VaultError> {
        let include_hidden = self.config.vault.include_hidden;
        let mut docs = Vec::new();

        let walker = WalkDir::new(&self.root)
            .into_iter()
            .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e.file_name()));

        for entry in walker {
            let entry = entry?;
            if entry.file_type().is_file() && self.is_document(entry.path()) {
                docs.push(entry.into_path());
            }
        }

        docs.sort();
        Ok(docs)
    }

    fn is_document(&self, path: &Path) -> bool {
        path.extension()
            .map(|ext| {
                let ext = ext.to_string_lossy();
                self.config
                    .vault
                    .extensions
                    .iter()
                    .any(|known| ext.eq_ignore_ascii_case(known))
            })
            .unwrap_or(false)
    }

    /// Resolve a document path given relative to the root (or absolute).
    pub fn resolve(&self, doc: &Path) -> Result<PathBuf, VaultError> {
        let path = if doc.is_absolute() {
            doc.to_path_buf()
        } else {
            self.root.join(doc)
        };
        if !path.is_file() {
            return Err(VaultError::DocumentNotFound(doc.to_path_buf()));
        }
        Ok(path)
    }

    fn relative<'a>(&self, path: &'a Path) -> &'a Path {
        path.strip_prefix(&self.root).unwrap_or(path)
    }

    /// Read every document, in parallel, skipping the unreadable ones.
    fn read_all(&self) -> Result<(Vec<(PathBuf, String)>, Vec<PathBuf>), VaultError> {
        let results: Vec<(PathBuf, std::io::Result<String>)> = self
            .documents()?
            .into_par_iter()
            .map(|path| {
                let content = fs::read_to_string(&path);
                (path, content)
            })
            .collect();

        let mut read = Vec::with_capacity(results.len());
        let mut skipped = Vec::new();
        for (path, content) in results {
            match content {
                Ok(text) => read.push((path, text)),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping unreadable document");
                    skipped.push(self.relative(&path).to_path_buf());
                }
            }
        }
        Ok((read, skipped))
    }

    // =========================================================================
    // Tag index seeding
    // =========================================================================

    /// Seed `index` with the tags of every gallery document in the vault.
    pub fn populate_index(&self, index: &mut TagIndex) -> Result<ScanReport, VaultError> {
        let (docs, skipped) = self.read_all()?;
        let markers = &self.config.markers;

        let mut report = ScanReport {
            documents: docs.len(),
            skipped,
            ..ScanReport::default()
        };

        for (path, text) in &docs {
            if !document::has_gallery_marker(text, markers) {
                continue;
            }
            report.gallery_documents += 1;
            let tags = document::extract_document_tags(text, markers);
            debug!(path = %self.relative(path).display(), tags = tags.len(), "indexed document");
            for tag in tags {
                if index.add_tag(&tag) {
                    report.new_tags += 1;
                }
            }
        }

        info!(
            documents = report.documents,
            galleries = report.gallery_documents,
            tags = index.len(),
            "tag index populated"
        );
        Ok(report)
    }

    /// Re-read one document after it changed and add its tags.
    ///
    /// Returns how many tags were new to the index.
    pub fn refresh_document(&self, doc: &Path, index: &mut TagIndex) -> Result<usize, VaultError> {
        let path = self.resolve(doc)?;
        let text = fs::read_to_string(&path)?;
        let added = document::extract_document_tags(&text, &self.config.markers)
            .iter()
            .filter(|tag| index.add_tag(tag))
            .count();
        debug!(path = %doc.display(), added, "refreshed document tags");
        Ok(added)
    }

    // =========================================================================
    // Galleries and search
    // =========================================================================

    /// Every document that has at least one gallery-related block.
    pub fn galleries(&self) -> Result<Vec<DocumentBlocks>, VaultError> {
        let (docs, _) = self.read_all()?;
        let markers = &self.config.markers;
        Ok(docs
            .iter()
            .filter_map(|(path, text)| {
                let blocks = document::find_blocks(text, markers);
                (!blocks.is_empty()).then(|| DocumentBlocks {
                    path: self.relative(path).to_path_buf(),
                    blocks,
                })
            })
            .collect())
    }

    /// Items from every gallery and single block that match `query`,
    /// in document order.
    pub fn search(&self, query: &SearchQuery) -> Result<Vec<FoundItem>, VaultError> {
        let mut found = Vec::new();
        for doc in self.galleries()? {
            for block in &doc.blocks {
                let Some(parsed) = block.parse() else {
                    continue;
                };
                found.extend(
                    parsed
                        .items
                        .into_iter()
                        .filter(|item| query.matches(item))
                        .map(|item| FoundItem {
                            document: doc.path.clone(),
                            line: block.line,
                            item,
                        }),
                );
            }
        }
        Ok(found)
    }

    /// Locate an embedded file: the path as written relative to the root,
    /// else the first file in the vault with the same file name.
    pub fn resolve_embed(&self, source: &str) -> Option<PathBuf> {
        let target = crate::source::embedded_path(source);
        let direct = self.root.join(target);
        if direct.is_file() {
            return Some(direct);
        }
        let name = Path::new(target).file_name()?;
        WalkDir::new(&self.root)
            .into_iter()
            .filter_map(Result::ok)
            .find(|e| e.file_type().is_file() && e.file_name() == name)
            .map(walkdir::DirEntry::into_path)
    }

    // =========================================================================
    // Tag edits
    // =========================================================================

    /// Replace the tags of the item whose source is `source` in document `doc`.
    ///
    /// New tags are trimmed, lower-cased and empty ones dropped. The index
    /// gains the new tags and loses dropped ones that no other item of the
    /// same block still uses. The document is then rewritten; if that write
    /// fails the error is logged and `persisted` is `false`.
    pub fn edit_item_tags(
        &self,
        doc: &Path,
        source: &str,
        new_tags: &[String],
        index: &mut TagIndex,
    ) -> Result<TagEditOutcome, VaultError> {
        let path = self.resolve(doc)?;
        let text = fs::read_to_string(&path)?;

        let (mut item, peers) = find_item(&text, source, &self.config.markers).ok_or_else(|| {
            VaultError::ItemNotFound {
                path: doc.to_path_buf(),
                item: source.to_string(),
            }
        })?;

        let next: Vec<String> = new_tags.iter().flat_map(|t| split_tags(t)).collect();
        let summary = index.apply_edit(&item.tags, &next, &peers);
        item.tags = next;

        let persisted = match document::rewrite_item_tags(&text, &item.source, &item.tags) {
            Some(rewritten) => match fs::write(&path, rewritten) {
                Ok(()) => true,
                Err(e) => {
                    error!(path = %doc.display(), error = %e, "failed to write tags");
                    false
                }
            },
            None => {
                warn!(path = %doc.display(), source = %item.source, "item source not found when writing tags");
                false
            }
        };

        Ok(TagEditOutcome {
            item,
            summary,
            persisted,
        })
    }
}

/// The first item with `source` in a gallery or single block, plus the other
/// items of that block.
fn find_item(
    text: &str,
    source: &str,
    markers: &config::MarkersConfig,
) -> Option<(GalleryItem, Vec<GalleryItem>)> {
    document::find_blocks(text, markers)
        .iter()
        .filter(|block| block.kind != BlockKind::Search)
        .filter_map(Block::parse)
        .find_map(|parsed| {
            let pos = parsed.items.iter().position(|i| i.source == source)?;
            let mut items = parsed.items;
            let item = items.remove(pos);
            Some((item, items))
        })
}

fn is_hidden(name: &std::ffi::OsStr) -> bool {
    name.to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::*;
    use crate::test_helpers::find_item;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn open_rejects_missing_root() {
        let tmp = tempfile::TempDir::new().unwrap();
        let result = Vault::open(&tmp.path().join("nope"));
        assert!(matches!(result, Err(VaultError::NotADirectory(_))));
    }

    #[test]
    fn documents_skip_hidden_and_non_markdown() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let names = document_names(&vault);
        assert!(names.contains(&"Pets.md".to_string()));
        assert!(names.contains(&"Trips/Japan.md".to_string()));
        assert!(!names.iter().any(|n| n.starts_with(".trash")));
        assert!(!names.iter().any(|n| n.ends_with(".txt")));
    }

    #[test]
    fn hidden_dirs_included_when_configured() {
        let tmp = setup_fixtures();
        let mut config = GalleryConfig::default();
        config.vault.include_hidden = true;
        let vault = Vault::with_config(tmp.path(), config);
        assert!(document_names(&vault).iter().any(|n| n.starts_with(".trash")));
    }

    #[test]
    fn populate_index_collects_gallery_tags() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let mut index = TagIndex::new();
        let report = vault.populate_index(&mut index).unwrap();

        assert!(index.has_tag("cat"));
        assert!(index.has_tag("temple"));
        assert!(index.has_tag("sunset"));
        // braces in a document without gallery markers are not tags
        assert!(!index.has_tag("not-a-tag"));
        assert!(report.gallery_documents >= 2);
        assert_eq!(report.new_tags, index.len());
        assert!(report.skipped.is_empty());
    }

    #[test]
    fn refresh_document_adds_new_tags() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let mut index = TagIndex::new();
        vault.populate_index(&mut index).unwrap();

        fs::write(
            tmp.path().join("Pets.md"),
            "```galleryx\nhamster.jpg {rodent}\n```\n",
        )
        .unwrap();
        let added = vault.refresh_document(Path::new("Pets.md"), &mut index).unwrap();
        assert_eq!(added, 1);
        assert!(index.has_tag("rodent"));
        // refresh is additive
        assert!(index.has_tag("cat"));
    }

    #[test]
    fn galleries_lists_documents_with_blocks() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let docs = vault.galleries().unwrap();
        let paths: Vec<String> = docs
            .iter()
            .map(|d| d.path.to_string_lossy().replace('\\', "/"))
            .collect();
        assert!(paths.contains(&"Pets.md".to_string()));
        assert!(!paths.contains(&"Plain.md".to_string()));

        let pets = find_document(&docs, "Pets.md");
        assert_eq!(find_item(pets, "whiskers.jpg").tags, vec!["cat", "cute"]);
        let japan = find_document(&docs, "Trips/Japan.md");
        assert!(find_item(japan, "![[kyoto.png|300]]").is_local);
    }

    #[test]
    fn search_finds_items_across_documents() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let hits = vault.search(&SearchQuery::from_input("cat", 50)).unwrap();
        assert!(!hits.is_empty());
        assert!(hits.iter().all(|h| h.item.tags.iter().any(|t| t.contains("cat"))));
    }

    #[test]
    fn search_with_two_tags_narrows() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let one = vault.search(&SearchQuery::from_input("cat", 50)).unwrap();
        let two = vault.search(&SearchQuery::from_input("cat, sleepy", 50)).unwrap();
        assert!(two.len() < one.len());
        assert_eq!(two.len(), 1);
    }

    #[test]
    fn resolve_embed_by_path_and_name() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        assert!(vault.resolve_embed("![[attachments/kyoto.png]]").is_some());
        assert!(vault.resolve_embed("![[kyoto.png|300]]").is_some());
        assert!(vault.resolve_embed("![[missing.png]]").is_none());
    }

    // =========================================================================
    // edit_item_tags
    // =========================================================================

    #[test]
    fn edit_rewrites_document_and_index() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let mut index = TagIndex::new();
        vault.populate_index(&mut index).unwrap();

        let outcome = vault
            .edit_item_tags(Path::new("Pets.md"), "whiskers.jpg", &tags(&["Cat", " Tabby "]), &mut index)
            .unwrap();

        assert!(outcome.persisted);
        assert_eq!(outcome.item.tags, vec!["cat", "tabby"]);
        assert!(index.has_tag("tabby"));

        let text = fs::read_to_string(tmp.path().join("Pets.md")).unwrap();
        assert!(text.contains("whiskers.jpg {cat, tabby}"));
    }

    #[test]
    fn edit_removes_tag_unused_in_block() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let mut index = TagIndex::new();
        vault.populate_index(&mut index).unwrap();
        assert!(index.has_tag("sleepy"));

        let outcome = vault
            .edit_item_tags(Path::new("Pets.md"), "nap.jpg", &tags(&["cat"]), &mut index)
            .unwrap();
        assert_eq!(outcome.summary.removed, vec!["sleepy"]);
        assert!(!index.has_tag("sleepy"));
        // still used by another item of the block
        assert!(index.has_tag("cat"));
    }

    #[test]
    fn edit_inline_single_keeps_code_span() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let mut index = TagIndex::new();
        vault.populate_index(&mut index).unwrap();
        let japan = Path::new("Trips/Japan.md");

        let outcome = vault
            .edit_item_tags(japan, "![[kyoto.png|300]]", &tags(&["Shrine"]), &mut index)
            .unwrap();
        assert!(outcome.persisted);

        let text = fs::read_to_string(tmp.path().join(japan)).unwrap();
        assert!(text.contains(
            "The best view was `galleryx-single: ![[kyoto.png|300]] {shrine}` from the hill.\n"
        ));

        // the item is still an inline single and can be edited again
        let again = vault
            .edit_item_tags(japan, "![[kyoto.png|300]]", &tags(&["shrine", "hill"]), &mut index)
            .unwrap();
        assert!(again.persisted);
        let docs = vault.galleries().unwrap();
        let item = find_item(find_document(&docs, "Trips/Japan.md"), "![[kyoto.png|300]]");
        assert_eq!(item.tags, vec!["shrine", "hill"]);
    }

    #[test]
    fn edit_unknown_item_is_error() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let mut index = TagIndex::new();
        let result = vault.edit_item_tags(Path::new("Pets.md"), "ghost.jpg", &[], &mut index);
        assert!(matches!(result, Err(VaultError::ItemNotFound { .. })));
    }

    #[test]
    fn edit_missing_document_is_error() {
        let tmp = setup_fixtures();
        let vault = Vault::open(tmp.path()).unwrap();
        let mut index = TagIndex::new();
        let result = vault.edit_item_tags(Path::new("Nope.md"), "a.jpg", &[], &mut index);
        assert!(matches!(result, Err(VaultError::DocumentNotFound(_))));
    }
}
