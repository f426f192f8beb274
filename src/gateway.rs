use crate::core::todo::{EditKind, ToDo, ToDoDraft};
use crate::store::{Mutation, RecordStore, StoreError};

/// The only write path into the store: turns add/edit/delete requests into
/// commits, assigning identity on add.
///
/// Input is not validated; empty names and unknown priorities are stored as
/// given.
#[derive(Debug, Clone)]
pub struct MutationGateway {
    store: RecordStore,
}

impl MutationGateway {
    pub fn new(store: RecordStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    /// Create a record with a freshly issued id and return it.
    ///
    /// If the issued id is already taken (two adds in the same second under
    /// [`IdStrategy::Timestamp`](crate::store::IdStrategy::Timestamp)) the add
    /// fails with [`StoreError::DuplicateId`] and nothing is overwritten.
    pub fn submit_add(&self, draft: ToDoDraft) -> Result<ToDo, StoreError> {
        let todo = draft.into_record(self.store.next_id());
        log::info!("Adding to-do {}: {}", todo.id, todo.name);
        self.store.commit(Mutation::Add(todo.clone()))?;
        Ok(todo)
    }

    /// Overwrite every field of the record `id`.
    pub fn submit_edit(&self, id: i64, draft: ToDoDraft) -> Result<ToDo, StoreError> {
        let todo = draft.into_record(id);
        log::info!("Editing to-do {}", id);
        self.store.commit(Mutation::Replace(todo.clone()))?;
        Ok(todo)
    }

    /// Remove the record `id`. Unknown ids succeed without effect.
    pub fn submit_delete(&self, id: i64) -> Result<(), StoreError> {
        log::info!("Deleting to-do {}", id);
        self.store.commit(Mutation::Delete(id))
    }

    pub fn submit(&self, kind: EditKind, draft: ToDoDraft) -> Result<ToDo, StoreError> {
        match kind {
            EditKind::Add => self.submit_add(draft),
            EditKind::Edit(id) => self.submit_edit(id, draft),
        }
    }
}
