use std::cmp::Ordering;

use super::todo::ToDo;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Id,
    Priority,
    Date,
}

impl SortKey {
    pub fn compare(&self, a: &ToDo, b: &ToDo) -> Ordering {
        match self {
            Self::Id => a.id.cmp(&b.id),
            Self::Priority => a.priority.cmp(&b.priority),
            Self::Date => a.date.cmp(&b.date),
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s {
            "id" => Some(Self::Id),
            "priority" => Some(Self::Priority),
            "date" => Some(Self::Date),
            _ => None,
        }
    }

    pub fn as_name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Priority => "priority",
            Self::Date => "date",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn is_ascending(self) -> bool {
        self == Self::Ascending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortState {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortState {
    pub fn new(key: SortKey, direction: SortDirection) -> Self {
        Self { key, direction }
    }

    /// Sort button press: select `key` and flip the direction.
    ///
    /// The direction flips on every press, including when switching from a
    /// different key.
    pub fn toggle(&mut self, key: SortKey) {
        self.key = key;
        self.direction = self.direction.flipped();
    }

    /// Stable sort by key, then reversed when descending.
    pub fn apply(&self, records: &mut Vec<ToDo>) {
        records.sort_by(|a, b| self.key.compare(a, b));
        if !self.direction.is_ascending() {
            records.reverse();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn todo(id: i64, priority: &str, day: u32) -> ToDo {
        let date = NaiveDate::from_ymd_opt(2026, 3, day)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap();
        ToDo::new(id, format!("task {id}"), priority, date)
    }

    fn ids(records: &[ToDo]) -> Vec<i64> {
        records.iter().map(|t| t.id).collect()
    }

    #[test]
    fn toggle_flips_on_every_press() {
        let mut state = SortState::default();
        state.toggle(SortKey::Priority);
        assert_eq!(state, SortState::new(SortKey::Priority, SortDirection::Descending));
        state.toggle(SortKey::Date);
        assert_eq!(state, SortState::new(SortKey::Date, SortDirection::Ascending));
        state.toggle(SortKey::Date);
        assert_eq!(state.direction, SortDirection::Descending);
    }

    #[test]
    fn stable_on_equal_keys() {
        let mut records = vec![todo(1, "2", 5), todo(2, "1", 5), todo(3, "2", 1), todo(4, "1", 9)];
        SortState::new(SortKey::Priority, SortDirection::Ascending).apply(&mut records);
        assert_eq!(ids(&records), vec![2, 4, 1, 3]);
    }

    #[test]
    fn descending_reverses_stable_order() {
        let mut records = vec![todo(1, "2", 5), todo(2, "1", 5), todo(3, "2", 1)];
        SortState::new(SortKey::Priority, SortDirection::Descending).apply(&mut records);
        assert_eq!(ids(&records), vec![3, 1, 2]);
    }

    #[test]
    fn sort_by_date() {
        let mut records = vec![todo(1, "3", 20), todo(2, "3", 2), todo(3, "3", 11)];
        SortState::new(SortKey::Date, SortDirection::Ascending).apply(&mut records);
        assert_eq!(ids(&records), vec![2, 3, 1]);
    }

    #[test]
    fn key_names() {
        for key in [SortKey::Id, SortKey::Priority, SortKey::Date] {
            assert_eq!(SortKey::from_name(key.as_name()), Some(key));
        }
        assert_eq!(SortKey::from_name("name"), None);
    }
}
