//! # GalleryX
//!
//! Image and video galleries written as plain text inside Markdown notes,
//! with case-insensitive tags, autocomplete and tag search across a vault.
//!
//! A gallery is a fenced code block whose body is a few optional setting lines
//! followed by one item per line:
//!
//! ~~~text
//! ```galleryx
//! settings: grid
//! columns: 3
//! https://example.com/cat.jpg {Cat, Pets}
//! ![[clips/run.mp4]] {sport}
//! ```
//! ~~~
//!
//! # Architecture: Pure Core, Thin Shell
//!
//! Everything that interprets text is a pure function over strings: the block
//! parser, the tag index, suggestion, search matching, pagination and the
//! viewer session. Only [`vault`] touches the filesystem, and only the binary
//! prints. This keeps the parsing rules testable line by line without fixture
//! files, and lets a host application drive the same core from its own UI.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`types`] | Value types: `GalleryItem`, `GallerySettings`, `LayoutKind` |
//! | [`source`] | Item source classification: embeds, aliases, video extensions |
//! | [`markup`] | Block body parser: setting lines, item lines, tag groups |
//! | [`document`] | Finds gallery, single and search blocks in Markdown; rewrites tag groups |
//! | [`tags`] | The tag index and edit bookkeeping |
//! | [`suggest`] | Tag autocomplete: matching, commit, keyboard cursor |
//! | [`search`] | Tag search queries and result pagination |
//! | [`viewer`] | Fullscreen navigation session over non-video items |
//! | [`vault`] | Walks a vault, seeds the index, searches and persists tag edits |
//! | [`config`] | `galleryx.toml` loading, validation and merging |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Tags Are Lower-Cased Once
//!
//! Tags are normalised when a line is parsed, never at comparison time. The
//! index, suggestions and search all compare plain strings, and a document
//! written with `{Cat}` and another with `{cat}` contribute one tag.
//!
//! ## The Index Only Grows on Scan
//!
//! Seeding and refreshing add tags; they never remove. A tag disappears only
//! when an edit drops it and no other item in the same block still carries it.
//! A stale tag costs one extra suggestion; a wrongly removed one loses data
//! the user typed.

pub mod config;
pub mod document;
pub mod markup;
pub mod output;
pub mod search;
pub mod source;
pub mod suggest;
pub mod tags;
pub mod types;
pub mod vault;
pub mod viewer;

#[cfg(test)]
pub(crate) mod test_helpers;
