pub mod search;
pub mod sort;
pub mod todo;
pub mod view;

pub use search::{NameFilter, SearchOutcome};
pub use sort::{SortDirection, SortKey, SortState};
pub use todo::{EditKind, Priority, ToDo, ToDoDraft};
pub use view::ViewConditioner;
