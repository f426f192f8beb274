//! Record store: the durable set of to-dos, identity assignment and change
//! notification.
//!
//! Every commit is serialized behind a single gate. A commit applies the
//! mutation to a copy of the record set, persists the copy through the
//! [`Backend`], swaps it in and only then notifies subscribers, so handlers
//! always see committed state, once per commit, in commit order.

pub mod backend;
pub mod error;

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::core::todo::{Priority, ToDo};

pub use backend::{Backend, JsonFileBackend, MemoryBackend};
pub use error::StoreError;
pub use crate::notify::{Subscribers, Subscription};

/// How [`RecordStore::next_id`] derives new identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// Seconds since the Unix epoch. Two adds within the same second get the
    /// same id and the second is rejected with [`StoreError::DuplicateId`].
    #[default]
    Timestamp,
    /// Seconds since the epoch, bumped past every id already issued or stored.
    Monotonic,
}

/// One atomic change to the record set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Insert a freshly identified record. Fails if the id is taken.
    Add(ToDo),
    /// Replace all fields of the record with the same id (insert if absent).
    Replace(ToDo),
    /// Remove by id. Absent ids are a no-op.
    Delete(i64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreEvent {
    /// Delivered once to each new subscriber with the current records.
    Initial(Vec<ToDo>),
    /// Delivered after every committed state change.
    Changed(Vec<ToDo>),
    /// The store hit a fatal error and accepts no further commits.
    Errored(String),
}

pub type Clock = Box<dyn Fn() -> i64 + Send + Sync>;

fn system_clock() -> Clock {
    Box::new(|| chrono::Utc::now().timestamp())
}

struct State {
    records: BTreeMap<i64, ToDo>,
    last_issued: i64,
    failure: Option<String>,
}

struct Inner {
    state: RwLock<State>,
    gate: Mutex<Box<dyn Backend>>,
    subscribers: Subscribers<StoreEvent>,
    clock: Clock,
    ids: IdStrategy,
}

/// Shared handle to the record set. Cloning is cheap and every clone sees the
/// same records and subscribers.
#[derive(Clone)]
pub struct RecordStore {
    inner: Arc<Inner>,
}

impl RecordStore {
    pub fn open(backend: impl Backend + 'static, ids: IdStrategy) -> Result<Self, StoreError> {
        Self::open_with_clock(backend, ids, system_clock())
    }

    pub fn open_with_clock(
        mut backend: impl Backend + 'static,
        ids: IdStrategy,
        clock: Clock,
    ) -> Result<Self, StoreError> {
        let loaded = backend.load()?;
        let mut records = BTreeMap::new();
        for todo in loaded {
            if !todo.priority.is_known() {
                log::warn!("Record {} has unknown priority {:?}", todo.id, todo.priority.as_str());
            }
            records.insert(todo.id, todo);
        }
        log::info!("Opened store with {} records", records.len());

        Ok(Self {
            inner: Arc::new(Inner {
                state: RwLock::new(State {
                    records,
                    last_issued: 0,
                    failure: None,
                }),
                gate: Mutex::new(Box::new(backend)),
                subscribers: Subscribers::new(),
                clock,
                ids,
            }),
        })
    }

    /// In-memory store, mostly for tests.
    pub fn in_memory(records: Vec<ToDo>) -> Result<Self, StoreError> {
        Self::open(MemoryBackend::with_records(records), IdStrategy::default())
    }

    /// All records ordered by id.
    pub fn all_records(&self) -> Vec<ToDo> {
        self.inner.state.read().records.values().cloned().collect()
    }

    pub fn get(&self, id: i64) -> Option<ToDo> {
        self.inner.state.read().records.get(&id).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.state.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn with_priority(&self, priority: &Priority) -> Vec<ToDo> {
        self.inner
            .state
            .read()
            .records
            .values()
            .filter(|t| t.priority == *priority)
            .cloned()
            .collect()
    }

    /// Records dated within `start..=end`, in id order.
    pub fn due_between(&self, start: NaiveDateTime, end: NaiveDateTime) -> Vec<ToDo> {
        self.inner
            .state
            .read()
            .records
            .values()
            .filter(|t| t.date >= start && t.date <= end)
            .cloned()
            .collect()
    }

    /// Identifier for a new record.
    ///
    /// With [`IdStrategy::Timestamp`] this is the current time in seconds and
    /// repeats if called twice within one second.
    pub fn next_id(&self) -> i64 {
        let now = (self.inner.clock)();
        let mut state = self.inner.state.write();
        let id = match self.inner.ids {
            IdStrategy::Timestamp => now,
            IdStrategy::Monotonic => {
                let highest = state
                    .records
                    .keys()
                    .next_back()
                    .copied()
                    .unwrap_or(0)
                    .max(state.last_issued);
                now.max(highest + 1).max(1)
            }
        };
        state.last_issued = state.last_issued.max(id);
        id
    }

    /// Register a change handler. It is called immediately with
    /// [`StoreEvent::Initial`] and then after every commit.
    ///
    /// Handlers run while the commit gate is held and must not commit.
    pub fn subscribe(&self, handler: impl FnMut(&StoreEvent) + Send + 'static) -> Subscription {
        let _gate = self.inner.gate.lock();
        let initial = {
            let state = self.inner.state.read();
            match &state.failure {
                Some(reason) => StoreEvent::Errored(reason.clone()),
                None => StoreEvent::Initial(state.records.values().cloned().collect()),
            }
        };
        self.inner.subscribers.add_primed(handler, &initial)
    }

    /// Change events as a channel, for consumers running on another task.
    pub fn watch(&self) -> (Subscription, mpsc::UnboundedReceiver<StoreEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let subscription = self.subscribe(move |event| {
            // receiver gone means nobody is listening any more
            let _ = tx.send(event.clone());
        });
        (subscription, rx)
    }

    /// Apply one mutation atomically and persist it.
    ///
    /// An [`Mutation::Add`] whose id already exists is rejected with
    /// [`StoreError::DuplicateId`] and changes nothing; the store stays usable.
    ///
    /// A persistence failure is fatal: subscribers receive
    /// [`StoreEvent::Errored`], the error is returned, and every later commit
    /// fails with [`StoreError::Failed`].
    pub fn commit(&self, mutation: Mutation) -> Result<(), StoreError> {
        let mut backend = self.inner.gate.lock();

        let mut next = {
            let state = self.inner.state.read();
            if state.failure.is_some() {
                return Err(StoreError::Failed);
            }
            state.records.clone()
        };

        match mutation {
            Mutation::Add(todo) => {
                if next.contains_key(&todo.id) {
                    log::warn!("Id collision on add, record {} already exists", todo.id);
                    return Err(StoreError::DuplicateId(todo.id));
                }
                log::debug!("Adding record {}", todo.id);
                next.insert(todo.id, todo);
            }
            Mutation::Replace(todo) => {
                log::debug!("Replacing record {}", todo.id);
                next.insert(todo.id, todo);
            }
            Mutation::Delete(id) => {
                if next.remove(&id).is_none() {
                    log::debug!("Delete of absent record {} ignored", id);
                    return Ok(());
                }
                log::debug!("Deleted record {}", id);
            }
        }

        let snapshot: Vec<ToDo> = next.values().cloned().collect();
        if let Err(e) = backend.save(&snapshot) {
            log::error!("Store commit failed: {}", e);
            self.inner.state.write().failure = Some(e.to_string());
            self.inner.subscribers.emit(&StoreEvent::Errored(e.to_string()));
            return Err(e);
        }

        self.inner.state.write().records = next;
        self.inner.subscribers.emit(&StoreEvent::Changed(snapshot));
        Ok(())
    }

    /// Whether a fatal error has been recorded.
    pub fn has_failed(&self) -> bool {
        self.inner.state.read().failure.is_some()
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.read();
        f.debug_struct("RecordStore")
            .field("records", &state.records.len())
            .field("ids", &self.inner.ids)
            .field("failed", &state.failure.is_some())
            .finish()
    }
}
