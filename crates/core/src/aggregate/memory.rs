//! In-memory book store.

use std::sync::{Mutex, MutexGuard};

use super::{
    reconcile, reconcile_favorite, Aggregate, BookFilter, BookRecord, BookStore, BookUpsert,
    ReconcileEvent, StoreError,
};

/// Book store holding the aggregate in process memory.
#[derive(Debug, Default)]
pub struct MemoryBookStore {
    aggregate: Mutex<Aggregate>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_aggregate(aggregate: Aggregate) -> Self {
        Self {
            aggregate: Mutex::new(aggregate),
        }
    }

    /// Copy of the current aggregate.
    pub fn snapshot(&self) -> Result<Aggregate, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Aggregate>, StoreError> {
        self.aggregate
            .lock()
            .map_err(|e| StoreError::Database(format!("store lock poisoned: {}", e)))
    }

    fn favorite(&self, title: &str, comment: Option<&str>) -> Result<ReconcileEvent, StoreError> {
        let mut guard = self.lock()?;
        let (next, event) = reconcile_favorite(std::mem::take(&mut *guard), title, comment);
        *guard = next;
        event.ok_or_else(|| StoreError::NotFound(title.trim().to_string()))
    }
}

impl BookStore for MemoryBookStore {
    fn upsert(&self, upsert: BookUpsert) -> Result<ReconcileEvent, StoreError> {
        let mut guard = self.lock()?;
        let (next, event) = reconcile(std::mem::take(&mut *guard), &upsert);
        *guard = next;
        Ok(event)
    }

    fn like(&self, title: &str) -> Result<ReconcileEvent, StoreError> {
        self.favorite(title, None)
    }

    fn add_reason(&self, title: &str, comment: &str) -> Result<ReconcileEvent, StoreError> {
        self.favorite(title, Some(comment))
    }

    fn get(&self, title: &str) -> Result<Option<BookRecord>, StoreError> {
        Ok(self.lock()?.get(title).cloned())
    }

    fn list(&self, filter: &BookFilter) -> Result<Vec<BookRecord>, StoreError> {
        Ok(self.lock()?.list(filter))
    }

    fn count(&self) -> Result<i64, StoreError> {
        Ok(self.lock()?.len() as i64)
    }

    fn ping(&self) -> Result<usize, StoreError> {
        Ok(self.lock()?.len().min(1))
    }
}
