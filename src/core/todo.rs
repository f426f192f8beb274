use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority level, stored as text and compared lexically.
///
/// The known levels are `"1"` through `"5"`, which sort the same lexically and
/// numerically. Anything else is accepted and simply sorts by its text.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Priority(String);

impl Priority {
    pub const LEVELS: [&'static str; 5] = ["1", "2", "3", "4", "5"];

    /// Level preselected for a new to-do.
    pub const DEFAULT: &'static str = "3";

    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Position of this priority in [`Priority::LEVELS`], if it is a known level.
    pub fn level_index(&self) -> Option<usize> {
        Self::LEVELS.iter().position(|l| *l == self.0)
    }

    pub fn is_known(&self) -> bool {
        self.level_index().is_some()
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::new(Self::DEFAULT)
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Priority {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToDo {
    pub id: i64,
    pub name: String,
    pub priority: Priority,
    pub date: NaiveDateTime,
}

impl ToDo {
    pub fn new(id: i64, name: impl Into<String>, priority: impl Into<Priority>, date: NaiveDateTime) -> Self {
        Self {
            id,
            name: name.into(),
            priority: priority.into(),
            date,
        }
    }

    /// Date as shown in list rows, e.g. `Aug 10, 2017`.
    pub fn display_date(&self) -> String {
        self.date.format("%b %d, %Y").to_string()
    }
}

/// User input for a to-do before it has an identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToDoDraft {
    pub name: String,
    pub priority: Priority,
    pub date: NaiveDateTime,
}

impl ToDoDraft {
    /// Blank form: empty name, default priority, current local time.
    pub fn new() -> Self {
        Self {
            name: String::new(),
            priority: Priority::default(),
            date: chrono::Local::now().naive_local(),
        }
    }

    pub fn with(name: impl Into<String>, priority: impl Into<Priority>, date: NaiveDateTime) -> Self {
        Self {
            name: name.into(),
            priority: priority.into(),
            date,
        }
    }

    /// Form prefilled from an existing record.
    pub fn from_record(todo: &ToDo) -> Self {
        Self {
            name: todo.name.clone(),
            priority: todo.priority.clone(),
            date: todo.date,
        }
    }

    pub fn into_record(self, id: i64) -> ToDo {
        ToDo {
            id,
            name: self.name,
            priority: self.priority,
            date: self.date,
        }
    }
}

impl Default for ToDoDraft {
    fn default() -> Self {
        Self::new()
    }
}

/// Whether a submitted draft creates a new record or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditKind {
    Add,
    Edit(i64),
}
