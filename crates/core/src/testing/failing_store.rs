//! Book store that fails every call.

use crate::aggregate::{BookFilter, BookRecord, BookStore, BookUpsert, ReconcileEvent, StoreError};

/// A [`BookStore`] whose every operation returns a database error.
#[derive(Debug, Clone)]
pub struct FailingBookStore {
    message: String,
}

impl Default for FailingBookStore {
    fn default() -> Self {
        Self::new("store offline")
    }
}

impl FailingBookStore {
    pub fn new(message: &str) -> Self {
        Self {
            message: message.to_string(),
        }
    }

    fn error(&self) -> StoreError {
        StoreError::Database(self.message.clone())
    }
}

impl BookStore for FailingBookStore {
    fn upsert(&self, _upsert: BookUpsert) -> Result<ReconcileEvent, StoreError> {
        Err(self.error())
    }

    fn like(&self, _title: &str) -> Result<ReconcileEvent, StoreError> {
        Err(self.error())
    }

    fn add_reason(&self, _title: &str, _comment: &str) -> Result<ReconcileEvent, StoreError> {
        Err(self.error())
    }

    fn get(&self, _title: &str) -> Result<Option<BookRecord>, StoreError> {
        Err(self.error())
    }

    fn list(&self, _filter: &BookFilter) -> Result<Vec<BookRecord>, StoreError> {
        Err(self.error())
    }

    fn count(&self) -> Result<i64, StoreError> {
        Err(self.error())
    }

    fn ping(&self) -> Result<usize, StoreError> {
        Err(self.error())
    }
}
