//! Centralized parsing of gallery item source references.
//!
//! A source is either a bare URL/path (`https://example.com/cat.jpg`,
//! `images/cat.jpg`) or an embed reference into the vault, written with the
//! host's embed-wrap syntax:
//!
//! - `![[cat.png]]` → local, path `cat.png`
//! - `![[clips/run.mp4|400]]` → local, path `clips/run.mp4` (alias/size dropped)
//! - `https://example.com/a.webm` → remote
//!
//! Media kind is not part of the parse: [`is_video_path`] looks at the end of
//! the whole trimmed source, so an embed (which ends in `]]`) is never a video.

/// Opening token of the embed-wrap syntax.
pub const EMBED_OPEN: &str = "![[";
/// Closing token of the embed-wrap syntax.
pub const EMBED_CLOSE: &str = "]]";

/// File extensions rendered as video, compared case-insensitively.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];

/// Result of parsing a trimmed source reference.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedSource<'a> {
    /// True when wrapped in `![[` … `]]`.
    pub is_local: bool,
    /// The path the reference points at. For embeds this is the text inside
    /// the wrap with any `|alias` suffix removed; otherwise the input itself.
    pub path: &'a str,
    /// Text after `|` inside an embed (display size or alias), if any.
    pub alias: Option<&'a str>,
}

/// Parse an already-trimmed source reference.
pub fn parse_source(source: &str) -> ParsedSource<'_> {
    if is_embed(source) {
        let inner = &source[EMBED_OPEN.len()..source.len() - EMBED_CLOSE.len()];
        let (path, alias) = match inner.split_once('|') {
            Some((path, alias)) => (path, Some(alias)),
            None => (inner, None),
        };
        return ParsedSource {
            is_local: true,
            path,
            alias,
        };
    }
    ParsedSource {
        is_local: false,
        path: source,
        alias: None,
    }
}

/// Whether `source` starts with the embed-open token and ends with the
/// embed-close token, without the two overlapping.
pub fn is_embed(source: &str) -> bool {
    source.len() >= EMBED_OPEN.len() + EMBED_CLOSE.len()
        && source.starts_with(EMBED_OPEN)
        && source.ends_with(EMBED_CLOSE)
}

/// Path of an embedded reference, for resolving it against the vault.
///
/// Non-embed sources come back unchanged.
pub fn embedded_path(source: &str) -> &str {
    parse_source(source).path
}

/// Whether `path` ends in `.mp4`, `.webm` or `.ogg`, ignoring case.
pub fn is_video_path(path: &str) -> bool {
    path.rsplit_once('.').is_some_and(|(_, ext)| {
        VIDEO_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}
