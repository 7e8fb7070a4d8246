//! Vault configuration module.
//!
//! Handles loading, validating, and merging `galleryx.toml`. Stock defaults
//! are overridden by the user's file at the vault root.
//!
//! ## Config File Location
//!
//! ```text
//! vault/
//! ├── galleryx.toml            # Optional, sparse overrides
//! ├── Trips/
//! │   └── Japan.md
//! └── Pets.md
//! ```
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [markers]
//! block = "galleryx"                 # Fenced gallery block language
//! search_block = "galleryx-search"   # Fenced search block language
//! single_block = "galleryx-single"   # Fenced single-item block language
//! inline_prefix = "galleryx-single:" # Inline code single-item marker
//!
//! [suggestions]
//! mode = "sorted"           # "sorted" (all, A-Z) or "top" (first N in index order)
//! limit = 5                 # N for "top"
//!
//! [search]
//! page_size = 50            # Default `limit:` for search blocks
//! flexbox_height = "295px"  # Row height of search result galleries
//!
//! [vault]
//! extensions = ["md"]       # Document extensions to scan
//! include_hidden = false    # Also scan dot-directories (.obsidian, .trash)
//!
//! [processing]
//! max_processes = 4         # Max parallel document readers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::markup::parse_px_length;
use crate::suggest::SuggestionMode;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the vault root.
pub const CONFIG_FILE: &str = "galleryx.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Vault configuration loaded from `galleryx.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GalleryConfig {
    /// Block languages and inline marker recognised in documents.
    pub markers: MarkersConfig,
    /// Tag autocomplete presentation.
    pub suggestions: SuggestionsConfig,
    /// Search block defaults.
    pub search: SearchConfig,
    /// Which files count as documents.
    pub vault: VaultConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl GalleryConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let markers = [
            ("markers.block", &self.markers.block),
            ("markers.search_block", &self.markers.search_block),
            ("markers.single_block", &self.markers.single_block),
            ("markers.inline_prefix", &self.markers.inline_prefix),
        ];
        for (key, value) in markers {
            if value.trim().is_empty() {
                return Err(ConfigError::Validation(format!("{key} must not be empty")));
            }
        }
        if self.markers.block.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "markers.block must be a single word".into(),
            ));
        }
        if self.suggestions.limit == 0 {
            return Err(ConfigError::Validation(
                "suggestions.limit must be at least 1".into(),
            ));
        }
        if self.search.page_size == 0 {
            return Err(ConfigError::Validation(
                "search.page_size must be at least 1".into(),
            ));
        }
        if parse_px_length(&self.search.flexbox_height) != Some(self.search.flexbox_height.as_str())
        {
            return Err(ConfigError::Validation(
                "search.flexbox_height must be a pixel length like \"295px\"".into(),
            ));
        }
        if self.vault.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "vault.extensions must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Block languages and inline marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkersConfig {
    pub block: String,
    pub search_block: String,
    pub single_block: String,
    pub inline_prefix: String,
}

impl Default for MarkersConfig {
    fn default() -> Self {
        Self {
            block: "galleryx".to_string(),
            search_block: "galleryx-search".to_string(),
            single_block: "galleryx-single".to_string(),
            inline_prefix: "galleryx-single:".to_string(),
        }
    }
}

/// Presentation style of the suggestion list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStyle {
    /// All matches, sorted, keyboard navigable.
    #[default]
    Sorted,
    /// First `limit` matches in index order, click to commit.
    Top,
}

/// Tag autocomplete settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestionsConfig {
    pub mode: SuggestionStyle,
    /// How many matches `top` mode shows.
    pub limit: usize,
}

impl Default for SuggestionsConfig {
    fn default() -> Self {
        Self {
            mode: SuggestionStyle::Sorted,
            limit: 5,
        }
    }
}

impl SuggestionsConfig {
    pub fn suggestion_mode(&self) -> SuggestionMode {
        match self.mode {
            SuggestionStyle::Sorted => SuggestionMode::Sorted,
            SuggestionStyle::Top => SuggestionMode::Top(self.limit),
        }
    }
}

/// Search block defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SearchConfig {
    /// Results per page when a search block has no usable `limit:`.
    pub page_size: usize,
    /// Row height for the flexbox that renders results.
    pub flexbox_height: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            page_size: crate::search::DEFAULT_PAGE_SIZE,
            flexbox_height: crate::search::DEFAULT_RESULTS_HEIGHT.to_string(),
        }
    }
}

/// Which files are documents.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// File extensions (without the dot), compared case-insensitively.
    pub extensions: Vec<String>,
    /// Descend into directories whose name starts with `.`.
    pub include_hidden: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["md".to_string()],
            include_hidden: false,
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel document readers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer user overrides are merged onto.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GalleryConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `galleryx.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist, `Err` if it is not TOML.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILE);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GalleryConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GalleryConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from `galleryx.toml` in the given vault root.
pub fn load_config(root: &Path) -> Result<GalleryConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(root)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `galleryx.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# GalleryX Configuration
# ======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Place this file at the root of the vault as galleryx.toml.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Block markers
# ---------------------------------------------------------------------------
[markers]
# Language of fenced gallery blocks: ```galleryx
block = "galleryx"

# Language of fenced search blocks (tags: / limit: lines).
search_block = "galleryx-search"

# Language of fenced single-item blocks.
single_block = "galleryx-single"

# Inline code spans starting with this prefix render a single item.
inline_prefix = "galleryx-single:"

# ---------------------------------------------------------------------------
# Tag autocomplete
# ---------------------------------------------------------------------------
[suggestions]
# "sorted": every matching tag, alphabetically.
# "top": the first `limit` matching tags, in index order.
mode = "sorted"
limit = 5

# ---------------------------------------------------------------------------
# Search blocks
# ---------------------------------------------------------------------------
[search]
# Results per page when a search block has no usable `limit:` line.
page_size = 50

# Row height of the gallery showing search results.
flexbox_height = "295px"

# ---------------------------------------------------------------------------
# Vault
# ---------------------------------------------------------------------------
[vault]
# File extensions treated as documents.
extensions = ["md"]

# Also scan directories starting with "." (.obsidian, .trash, ...).
include_hidden = false

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel document readers during a vault scan.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4
"##
}
