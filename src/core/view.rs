use super::search::{self, NameFilter, SearchOutcome};
use super::sort::{SortDirection, SortKey, SortState};
use super::todo::ToDo;

/// Sort and filter state for the to-do list, and the projection it defines.
///
/// Holds no records of its own; [`ViewConditioner::condition`] is a pure
/// function of its input and this state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewConditioner {
    sort: SortState,
    filter: Option<NameFilter>,
}

impl ViewConditioner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sort(&self) -> SortState {
        self.sort
    }

    pub fn active_filter(&self) -> Option<&NameFilter> {
        self.filter.as_ref()
    }

    pub fn set_sort(&mut self, key: SortKey, direction: SortDirection) {
        self.sort = SortState::new(key, direction);
    }

    pub fn toggle_sort(&mut self, key: SortKey) {
        self.sort.toggle(key);
        log::debug!(
            "Sort toggled: {} {:?}",
            self.sort.key.as_name(),
            self.sort.direction
        );
    }

    pub fn set_filter(&mut self, filter: Option<NameFilter>) {
        self.filter = filter;
    }

    /// Apply new search box text against the full record set.
    ///
    /// Only [`SearchOutcome::Cleared`] and [`SearchOutcome::Applied`] touch
    /// the filter; short input and zero-match input leave it as it was.
    pub fn set_search_text(&mut self, text: &str, records: &[ToDo]) -> SearchOutcome {
        let outcome = search::evaluate(text, records);
        match &outcome {
            SearchOutcome::Cleared => self.filter = None,
            SearchOutcome::Applied(filter) => self.filter = Some(filter.clone()),
            SearchOutcome::TooShort => {}
            SearchOutcome::NoMatches => {
                log::debug!("Search {:?} matched nothing, keeping previous filter", text);
            }
        }
        outcome
    }

    /// Filter, stable sort, then reverse when descending.
    pub fn condition(&self, records: &[ToDo]) -> Vec<ToDo> {
        let mut out: Vec<ToDo> = match &self.filter {
            Some(filter) => records.iter().filter(|t| filter.matches(t)).cloned().collect(),
            None => records.to_vec(),
        };
        self.sort.apply(&mut out);
        out
    }
}
