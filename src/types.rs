//! Value objects produced by the gallery markup parser.
//!
//! Every parse of a block builds these fresh. They carry no identity: two
//! items with the same fields are the same item as far as the renderer is
//! concerned. All of them serialize to JSON so the `parse` command can hand
//! them to a host renderer verbatim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A single entry of a gallery block.
///
/// Produced by [`crate::markup::parse_gallery_items`]. The `source` is never
/// empty: lines that trim to nothing are dropped before an item is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryItem {
    /// Bare URL/path, or an embed reference like `![[photos/cat.png]]`.
    pub source: String,
    /// Whether `source` uses the embed-wrap syntax (a file inside the vault).
    pub is_local: bool,
    /// Whether the trimmed source ends in a known video extension.
    pub is_video: bool,
    /// Lower-cased, trimmed tags in the order they were written.
    pub tags: Vec<String>,
}

impl GalleryItem {
    /// Whether this item carries `tag`, compared case-insensitively.
    pub fn has_tag(&self, tag: &str) -> bool {
        let needle = tag.to_lowercase();
        self.tags.iter().any(|t| t.to_lowercase() == needle)
    }
}

/// Rendering arrangement requested by a `settings:` line.
///
/// The known kinds get their own variant; anything else is carried through
/// verbatim as [`LayoutKind::Other`] and left for the renderer to interpret.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum LayoutKind {
    #[default]
    Flexbox,
    Grid,
    Single,
    VideoGrid,
    Other(String),
}

impl LayoutKind {
    /// Map a raw `settings:` token to a layout kind. Never fails.
    pub fn from_token(token: &str) -> Self {
        match token {
            "flexbox" => LayoutKind::Flexbox,
            "grid" => LayoutKind::Grid,
            "single" => LayoutKind::Single,
            "videogrid" => LayoutKind::VideoGrid,
            other => LayoutKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            LayoutKind::Flexbox => "flexbox",
            LayoutKind::Grid => "grid",
            LayoutKind::Single => "single",
            LayoutKind::VideoGrid => "videogrid",
            LayoutKind::Other(token) => token,
        }
    }

    /// Whether a `columns:` value applies to this layout.
    pub fn uses_columns(&self) -> bool {
        matches!(self, LayoutKind::Grid | LayoutKind::VideoGrid)
    }
}

impl fmt::Display for LayoutKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<String> for LayoutKind {
    fn from(token: String) -> Self {
        LayoutKind::from_token(&token)
    }
}

impl From<LayoutKind> for String {
    fn from(kind: LayoutKind) -> Self {
        kind.as_str().to_string()
    }
}

/// Per-block settings gathered from the leading setting lines.
///
/// `flexbox_height` and `columns` are stored whenever they parse, whatever
/// the layout; use [`GallerySettings::effective_flexbox_height`] and
/// [`GallerySettings::effective_columns`] to read them only where they apply.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct GallerySettings {
    pub layout: LayoutKind,
    /// CSS length such as `"300px"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flexbox_height: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<u32>,
}

impl GallerySettings {
    pub fn with_layout(layout: LayoutKind) -> Self {
        Self {
            layout,
            ..Self::default()
        }
    }

    pub fn effective_flexbox_height(&self) -> Option<&str> {
        match self.layout {
            LayoutKind::Flexbox => self.flexbox_height.as_deref(),
            _ => None,
        }
    }

    pub fn effective_columns(&self) -> Option<u32> {
        if self.layout.uses_columns() {
            self.columns
        } else {
            None
        }
    }
}
