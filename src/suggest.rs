//! Tag autocomplete for comma-separated tag fields.
//!
//! While a user types `cat, pets, an`, everything before the last comma is
//! already chosen and `an` is the token in progress. [`suggest`] offers every
//! indexed tag containing the in-progress token as a substring, minus the
//! tags already chosen. [`commit_suggestion`] swaps the in-progress token for
//! the picked tag and leaves the field ready for the next one:
//!
//! ```text
//! "cat, an"  + "animal"  →  "cat, animal, "
//! ```
//!
//! Two presentation styles share this core, selected by [`SuggestionMode`]:
//!
//! - [`SuggestionMode::Sorted`]: every match, sorted, navigated with a
//!   [`SuggestionCursor`] (up/down wrap around, Enter commits the highlight).
//! - [`SuggestionMode::Top`]: the first `n` matches in index order, committed
//!   by clicking.

use crate::tags::TagIndex;

/// How many matches to return and in what order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SuggestionMode {
    #[default]
    Sorted,
    Top(usize),
}

/// A tag field's text split into chosen tags and the token being typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagInput<'a> {
    /// Trimmed segments before the last comma.
    pub chosen: Vec<&'a str>,
    /// Trimmed segment after the last comma.
    pub current: &'a str,
}

impl<'a> TagInput<'a> {
    pub fn parse(input: &'a str) -> Self {
        let mut segments: Vec<&str> = input.split(',').map(str::trim).collect();
        // split always yields at least one segment
        let current = segments.pop().unwrap_or_default();
        TagInput {
            chosen: segments,
            current,
        }
    }

    fn is_chosen(&self, tag_lower: &str) -> bool {
        self.chosen.iter().any(|c| c.to_lowercase() == tag_lower)
    }
}

/// Candidate tags for the in-progress token of `input`.
///
/// Empty when the in-progress token is empty.
pub fn suggest(input: &str, index: &TagIndex, mode: SuggestionMode) -> Vec<String> {
    let parsed = TagInput::parse(input);
    let needle = parsed.current.to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }

    let matches = index.iter().filter(|tag| {
        let lower = tag.to_lowercase();
        lower.contains(&needle) && !parsed.is_chosen(&lower)
    });

    match mode {
        SuggestionMode::Sorted => {
            let mut all: Vec<String> = matches.map(str::to_string).collect();
            all.sort();
            all
        }
        SuggestionMode::Top(limit) => matches.take(limit).map(str::to_string).collect(),
    }
}

/// Replace the in-progress token of `input` with `chosen` and append `", "`.
///
/// Chosen segments are kept (trimmed) and re-joined with `", "`.
pub fn commit_suggestion(input: &str, chosen: &str) -> String {
    let parsed = TagInput::parse(input);
    let mut out = String::with_capacity(input.len() + chosen.len() + 2);
    for segment in &parsed.chosen {
        out.push_str(segment);
        out.push_str(", ");
    }
    out.push_str(chosen);
    out.push_str(", ");
    out
}

/// Keyboard highlight over a sorted suggestion list.
///
/// Nothing is highlighted initially. Moving down from nothing selects the
/// first entry, moving up selects the last; both directions wrap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionCursor {
    suggestions: Vec<String>,
    selected: Option<usize>,
}

impl SuggestionCursor {
    pub fn new(suggestions: Vec<String>) -> Self {
        Self {
            suggestions,
            selected: None,
        }
    }

    /// Recompute suggestions for `input` in sorted mode, resetting the highlight.
    pub fn for_input(input: &str, index: &TagIndex) -> Self {
        Self::new(suggest(input, index, SuggestionMode::Sorted))
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected
            .and_then(|i| self.suggestions.get(i))
            .map(String::as_str)
    }

    pub fn move_down(&mut self) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(i) => (i + 1) % len,
            None => 0,
        });
    }

    pub fn move_up(&mut self) {
        let len = self.suggestions.len();
        if len == 0 {
            return;
        }
        self.selected = Some(match self.selected {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        });
    }

    /// Commit the highlighted suggestion into `input`.
    ///
    /// `None` when nothing is highlighted, so Enter falls through to the
    /// field's own handling.
    pub fn commit(&self, input: &str) -> Option<String> {
        self.selected().map(|tag| commit_suggestion(input, tag))
    }
}
