use unicode_segmentation::UnicodeSegmentation;

use super::todo::ToDo;

/// Search text needs at least this many user-perceived characters (grapheme
/// clusters) to build a filter.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Case-insensitive "name contains" filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameFilter {
    text: String,
    needle: String,
}

impl NameFilter {
    pub fn new(text: impl Into<String>) -> Self {
        let text = text.into();
        let needle = text.to_lowercase();
        Self { text, needle }
    }

    /// The search text as typed.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn matches(&self, todo: &ToDo) -> bool {
        todo.name.to_lowercase().contains(&self.needle)
    }
}

/// What a change of search text did to the active filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Empty input, filtering switched off.
    Cleared,
    /// The new filter matched at least one record and is now active.
    Applied(NameFilter),
    /// Input too short, nothing changed.
    TooShort,
    /// The new filter matched nothing; the previous filter stays in place.
    NoMatches,
}

impl SearchOutcome {
    /// Whether the conditioned view has to be recomputed.
    pub fn changes_view(&self) -> bool {
        matches!(self, Self::Cleared | Self::Applied(_))
    }
}

/// Turns search box input into a filter decision.
///
/// Matches are counted against the full record set, not the current view.
pub fn evaluate(text: &str, records: &[ToDo]) -> SearchOutcome {
    if text.is_empty() {
        return SearchOutcome::Cleared;
    }
    if text.graphemes(true).count() < MIN_SEARCH_CHARS {
        return SearchOutcome::TooShort;
    }

    let filter = NameFilter::new(text);
    if records.iter().any(|t| filter.matches(t)) {
        SearchOutcome::Applied(filter)
    } else {
        SearchOutcome::NoMatches
    }
}
