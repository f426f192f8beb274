//! The to-do list as seen by a presentation layer.
//!
//! [`TodoList`] wires the store, the mutation gateway and the view
//! conditioner together. Every store change, sort toggle or filter change
//! recomputes the conditioned view from scratch and hands it to view
//! listeners as [`ViewEvent::Updated`].

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::search::{NameFilter, SearchOutcome};
use crate::core::sort::{SortDirection, SortKey, SortState};
use crate::core::todo::{EditKind, ToDo, ToDoDraft};
use crate::core::view::ViewConditioner;
use crate::gateway::MutationGateway;
use crate::notify::{Subscribers, Subscription};
use crate::store::{RecordStore, StoreError, StoreEvent};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// The conditioned records, in display order.
    Updated(Vec<ToDo>),
    /// The store failed fatally. No further updates follow.
    Failed(String),
}

#[derive(Default)]
struct ListState {
    conditioner: ViewConditioner,
    base: Vec<ToDo>,
    view: Vec<ToDo>,
    failure: Option<String>,
}

impl ListState {
    fn recondition(&mut self) -> ViewEvent {
        self.view = self.conditioner.condition(&self.base);
        log::debug!("Reconditioned view: {} of {} records", self.view.len(), self.base.len());
        self.current_event()
    }

    fn current_event(&self) -> ViewEvent {
        match &self.failure {
            Some(reason) => ViewEvent::Failed(reason.clone()),
            None => ViewEvent::Updated(self.view.clone()),
        }
    }
}

pub struct TodoList {
    gateway: MutationGateway,
    state: Arc<Mutex<ListState>>,
    listeners: Arc<Subscribers<ViewEvent>>,
    /// Held from recomputing a view until listeners have it, so events
    /// reach listeners in the order the views were computed.
    emit_gate: Arc<Mutex<()>>,
    _store_subscription: Subscription,
}

impl TodoList {
    pub fn new(store: RecordStore) -> Self {
        let state = Arc::new(Mutex::new(ListState::default()));
        let listeners = Arc::new(Subscribers::new());
        let emit_gate = Arc::new(Mutex::new(()));

        let handler_state = state.clone();
        let handler_listeners = listeners.clone();
        let handler_gate = emit_gate.clone();
        let store_subscription = store.subscribe(move |event| {
            let _emitting = handler_gate.lock();
            let out = {
                let mut state = handler_state.lock();
                match event {
                    StoreEvent::Initial(records) | StoreEvent::Changed(records) => {
                        state.base = records.clone();
                        state.recondition()
                    }
                    StoreEvent::Errored(reason) => {
                        log::error!("To-do store failed: {}", reason);
                        state.failure = Some(reason.clone());
                        state.current_event()
                    }
                }
            };
            handler_listeners.emit(&out);
        });

        Self {
            gateway: MutationGateway::new(store),
            state,
            listeners,
            emit_gate,
            _store_subscription: store_subscription,
        }
    }

    pub fn store(&self) -> &RecordStore {
        self.gateway.store()
    }

    /// Register a view listener. It immediately receives the current view.
    ///
    /// Listeners may read the list but must not submit mutations, sort or
    /// search from inside the callback.
    pub fn subscribe(&self, handler: impl FnMut(&ViewEvent) + Send + 'static) -> Subscription {
        let _emitting = self.emit_gate.lock();
        let current = self.state.lock().current_event();
        self.listeners.add_primed(handler, &current)
    }

    /// The current conditioned records.
    pub fn view(&self) -> Vec<ToDo> {
        self.state.lock().view.clone()
    }

    pub fn sort(&self) -> SortState {
        self.state.lock().conditioner.sort()
    }

    pub fn active_filter(&self) -> Option<NameFilter> {
        self.state.lock().conditioner.active_filter().cloned()
    }

    pub fn submit_add(&self, draft: ToDoDraft) -> Result<ToDo, StoreError> {
        self.gateway.submit_add(draft)
    }

    pub fn submit_edit(&self, id: i64, draft: ToDoDraft) -> Result<ToDo, StoreError> {
        self.gateway.submit_edit(id, draft)
    }

    pub fn submit_delete(&self, id: i64) -> Result<(), StoreError> {
        self.gateway.submit_delete(id)
    }

    pub fn submit(&self, kind: EditKind, draft: ToDoDraft) -> Result<ToDo, StoreError> {
        self.gateway.submit(kind, draft)
    }

    /// Record shown at `row` of the current view.
    pub fn record_at(&self, row: usize) -> Option<ToDo> {
        self.state.lock().view.get(row).cloned()
    }

    /// Delete the record shown at `row`. Rows past the end do nothing.
    pub fn delete_at(&self, row: usize) -> Result<Option<ToDo>, StoreError> {
        let Some(todo) = self.record_at(row) else {
            return Ok(None);
        };
        self.gateway.submit_delete(todo.id)?;
        Ok(Some(todo))
    }

    pub fn toggle_sort(&self, key: SortKey) {
        self.update(|conditioner, _| conditioner.toggle_sort(key));
    }

    pub fn set_sort(&self, key: SortKey, direction: SortDirection) {
        self.update(|conditioner, _| conditioner.set_sort(key, direction));
    }

    /// Feed new search box text. The view is only recomputed when the filter
    /// was cleared or replaced.
    pub fn set_search_text(&self, text: &str) -> SearchOutcome {
        let mut outcome = SearchOutcome::TooShort;
        let changed = self.update_if(|conditioner, base| {
            outcome = conditioner.set_search_text(text, base);
            outcome.changes_view()
        });
        log::debug!("Search {:?}: view changed = {}", text, changed);
        outcome
    }

    fn update(&self, f: impl FnOnce(&mut ViewConditioner, &[ToDo])) {
        self.update_if(|conditioner, base| {
            f(conditioner, base);
            true
        });
    }

    fn update_if(&self, f: impl FnOnce(&mut ViewConditioner, &[ToDo]) -> bool) -> bool {
        let _emitting = self.emit_gate.lock();
        let event = {
            let mut guard = self.state.lock();
            let state = &mut *guard;
            if !f(&mut state.conditioner, &state.base) {
                return false;
            }
            state.recondition()
        };
        self.listeners.emit(&event);
        true
    }
}

impl std::fmt::Debug for TodoList {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("TodoList")
            .field("sort", &state.conditioner.sort())
            .field("filter", &state.conditioner.active_filter())
            .field("rows", &state.view.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Backend, Clock, IdStrategy, MemoryBackend};
    use chrono::{NaiveDate, NaiveDateTime};

    fn d(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 7, day)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap()
    }

    fn ids(records: &[ToDo]) -> Vec<i64> {
        records.iter().map(|t| t.id).collect()
    }

    fn milk_and_mom() -> TodoList {
        let clock: Clock = Box::new(|| 1_760_000_000);
        let store = RecordStore::open_with_clock(
            MemoryBackend::with_records(vec![
                ToDo::new(1, "Buy milk", "3", d(1)),
                ToDo::new(2, "Call mom", "1", d(2)),
            ]),
            IdStrategy::Monotonic,
            clock,
        )
        .unwrap();
        TodoList::new(store)
    }

    fn recorder(list: &TodoList) -> (Subscription, Arc<Mutex<Vec<ViewEvent>>>) {
        let events = Arc::new(Mutex::new(Vec::new()));
        let sink = events.clone();
        let sub = list.subscribe(move |e| sink.lock().push(e.clone()));
        (sub, events)
    }

    #[test]
    fn initial_view_is_id_order() {
        let list = milk_and_mom();
        assert_eq!(ids(&list.view()), vec![1, 2]);
        let (_sub, events) = recorder(&list);
        assert!(matches!(&events.lock()[0], ViewEvent::Updated(v) if ids(v) == vec![1, 2]));
    }

    #[test]
    fn priority_sort_then_toggle() {
        let list = milk_and_mom();
        list.set_sort(SortKey::Priority, SortDirection::Ascending);
        assert_eq!(ids(&list.view()), vec![2, 1]);
        list.toggle_sort(SortKey::Priority);
        assert_eq!(ids(&list.view()), vec![1, 2]);
    }

    #[test]
    fn toggling_two_keys_flips_twice() {
        let list = milk_and_mom();
        list.toggle_sort(SortKey::Priority);
        assert_eq!(list.sort().direction, SortDirection::Descending);
        list.toggle_sort(SortKey::Date);
        assert_eq!(list.sort(), SortState::new(SortKey::Date, SortDirection::Ascending));
    }

    #[test]
    fn add_appears_in_view_with_larger_id() {
        let list = milk_and_mom();
        let (_sub, events) = recorder(&list);
        let added = list
            .submit(EditKind::Add, ToDoDraft::with("Walk dog", "2", d(3)))
            .unwrap();
        assert!(added.id > 2);
        assert_eq!(ids(&list.view()), vec![1, 2, added.id]);
        assert_eq!(events.lock().len(), 2);
    }

    #[test]
    fn edit_resorts_view() {
        let list = milk_and_mom();
        list.set_sort(SortKey::Priority, SortDirection::Ascending);
        list.submit_edit(1, ToDoDraft::with("Buy milk", "1", d(1))).unwrap();
        // equal priorities keep id order
        assert_eq!(ids(&list.view()), vec![1, 2]);
        list.submit_edit(1, ToDoDraft::with("Buy milk", "5", d(1))).unwrap();
        assert_eq!(ids(&list.view()), vec![2, 1]);
    }

    #[test]
    fn search_filters_view_and_survives_store_changes() {
        let list = milk_and_mom();
        assert!(matches!(list.set_search_text("MOM"), SearchOutcome::Applied(_)));
        assert_eq!(ids(&list.view()), vec![2]);

        list.submit_add(ToDoDraft::with("Mom's birthday", "2", d(5))).unwrap();
        assert_eq!(list.view().len(), 2);
        assert!(list.view().iter().all(|t| t.name.to_lowercase().contains("mom")));
    }

    #[test]
    fn one_char_search_changes_nothing() {
        let list = milk_and_mom();
        list.set_search_text("milk");
        let (_sub, events) = recorder(&list);

        assert_eq!(list.set_search_text("a"), SearchOutcome::TooShort);
        assert_eq!(list.active_filter().map(|f| f.text().to_string()), Some("milk".into()));
        assert_eq!(events.lock().len(), 1, "no recondition");
    }

    #[test]
    fn zero_match_search_keeps_previous_filter() {
        let list = milk_and_mom();
        list.set_search_text("call");
        assert_eq!(list.set_search_text("xyz"), SearchOutcome::NoMatches);
        assert_eq!(list.active_filter().map(|f| f.text().to_string()), Some("call".into()));
        assert_eq!(ids(&list.view()), vec![2]);
    }

    #[test]
    fn empty_search_restores_everything() {
        let list = milk_and_mom();
        list.set_search_text("call");
        assert_eq!(list.set_search_text(""), SearchOutcome::Cleared);
        assert!(list.active_filter().is_none());
        assert_eq!(ids(&list.view()), vec![1, 2]);
    }

    #[test]
    fn delete_by_row_uses_conditioned_order() {
        let list = milk_and_mom();
        list.set_sort(SortKey::Priority, SortDirection::Ascending);
        assert_eq!(list.record_at(0).map(|t| t.id), Some(2));

        let removed = list.delete_at(0).unwrap();
        assert_eq!(removed.map(|t| t.id), Some(2));
        assert_eq!(ids(&list.view()), vec![1]);
        assert_eq!(list.delete_at(5).unwrap(), None);
    }

    #[test]
    fn deleting_unknown_id_is_quiet() {
        let list = milk_and_mom();
        let (_sub, events) = recorder(&list);
        list.submit_delete(999).unwrap();
        assert_eq!(ids(&list.view()), vec![1, 2]);
        assert_eq!(events.lock().len(), 1);
    }

    #[test]
    fn last_event_matches_view_under_concurrent_updates() {
        let list = Arc::new(milk_and_mom());
        let (_sub, events) = recorder(&list);

        let sorter = {
            let list = list.clone();
            std::thread::spawn(move || {
                for i in 0..200 {
                    let key = if i % 2 == 0 { SortKey::Priority } else { SortKey::Date };
                    list.toggle_sort(key);
                }
            })
        };
        let writer = {
            let list = list.clone();
            std::thread::spawn(move || {
                for i in 0..50 {
                    list.submit_edit(100 + i, ToDoDraft::with("Chore", "2", d(3))).unwrap();
                }
            })
        };
        sorter.join().unwrap();
        writer.join().unwrap();

        let last = events.lock().last().cloned();
        assert_eq!(last, Some(ViewEvent::Updated(list.view())));
        assert_eq!(events.lock().len(), 1 + 200 + 50);
    }

    struct FailOnSave;

    impl Backend for FailOnSave {
        fn load(&mut self) -> Result<Vec<ToDo>, StoreError> {
            Ok(vec![ToDo::new(1, "Buy milk", "3", d(1))])
        }

        fn save(&mut self, _records: &[ToDo]) -> Result<(), StoreError> {
            Err(StoreError::Io {
                path: "todos.json".into(),
                source: std::io::Error::other("read-only filesystem"),
            })
        }
    }

    #[test]
    fn store_failure_reaches_listeners() {
        let store = RecordStore::open(FailOnSave, IdStrategy::Timestamp).unwrap();
        let list = TodoList::new(store);
        let (_sub, events) = recorder(&list);

        assert!(list.submit_delete(1).is_err());
        assert!(matches!(events.lock().last(), Some(ViewEvent::Failed(_))));
        // the last good view is still readable
        assert_eq!(ids(&list.view()), vec![1]);
    }
}
