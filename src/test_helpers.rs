//! Shared test utilities for the galleryx test suite.
//!
//! Provides fixture setup and lookup helpers that panic with the available
//! names on a miss, so a failing test says what it did find.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_fixtures();
//! let vault = Vault::open(tmp.path()).unwrap();
//!
//! let docs = vault.galleries().unwrap();
//! let pets = find_document(&docs, "Pets.md");
//! let item = find_item(pets, "whiskers.jpg");
//! assert_eq!(item.tags, vec!["cat", "cute"]);
//! ```

use std::path::Path;
use tempfile::TempDir;

use crate::types::GalleryItem;
use crate::vault::{DocumentBlocks, Vault};

// =========================================================================
// Fixture setup
// =========================================================================

/// Copy `fixtures/vault/` to a temp directory and return it.
///
/// Tests get an isolated copy they can mutate without affecting other tests
/// or the source fixtures.
pub fn setup_fixtures() -> TempDir {
    let tmp = TempDir::new().unwrap();
    let fixtures = Path::new(env!("CARGO_MANIFEST_DIR")).join("fixtures/vault");
    copy_dir_recursive(&fixtures, tmp.path()).unwrap();
    tmp
}

fn copy_dir_recursive(src: &Path, dst: &Path) -> std::io::Result<()> {
    for entry in std::fs::read_dir(src)? {
        let entry = entry?;
        let src_path = entry.path();
        let dst_path = dst.join(entry.file_name());

        if src_path.is_dir() {
            std::fs::create_dir_all(&dst_path)?;
            copy_dir_recursive(&src_path, &dst_path)?;
        } else {
            std::fs::copy(&src_path, &dst_path)?;
        }
    }
    Ok(())
}

// =========================================================================
// Lookups
// =========================================================================

/// Vault documents relative to the root, `/`-separated.
pub fn document_names(vault: &Vault) -> Vec<String> {
    vault
        .documents()
        .unwrap()
        .iter()
        .map(|p| {
            p.strip_prefix(vault.root())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect()
}

/// Find a document's blocks by relative path. Panics if not found.
pub fn find_document<'a>(docs: &'a [DocumentBlocks], path: &str) -> &'a DocumentBlocks {
    docs.iter()
        .find(|d| d.path.to_string_lossy().replace('\\', "/") == path)
        .unwrap_or_else(|| {
            let paths: Vec<String> = docs
                .iter()
                .map(|d| d.path.to_string_lossy().to_string())
                .collect();
            panic!("document '{path}' not found. Available: {paths:?}")
        })
}

/// Find an item by source in any block of a document. Panics if not found.
pub fn find_item(doc: &DocumentBlocks, source: &str) -> GalleryItem {
    let items: Vec<GalleryItem> = doc
        .blocks
        .iter()
        .filter_map(|b| b.parse())
        .flat_map(|p| p.items)
        .collect();
    items
        .iter()
        .find(|i| i.source == source)
        .cloned()
        .unwrap_or_else(|| {
            let sources: Vec<&str> = items.iter().map(|i| i.source.as_str()).collect();
            panic!(
                "item '{source}' not found in '{}'. Available: {sources:?}",
                doc.path.display()
            )
        })
}
