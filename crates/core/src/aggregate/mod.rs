//! The shared book list: one record per normalized title.
//!
//! The persistent store is the source of truth. Writes go through
//! [`BookStore`], whose upsert follows the merge rule in [`reconcile`];
//! clients keep an [`Aggregate`] projection and fold the returned
//! [`ReconcileEvent`]s into it.

mod memory;
mod reconcile;
mod sqlite;
mod types;

pub use memory::MemoryBookStore;
pub use reconcile::{reconcile, reconcile_favorite, Aggregate};
pub use sqlite::SqliteBookStore;
pub use types::{
    age_buckets, dedup_links, normalize_title, BookFilter, BookRecord, BookUpsert, PurchaseLink,
    ReconcileEvent, SortOrder,
};

use thiserror::Error;

/// Error type for store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No record for the normalized title.
    #[error("Book not found: {0}")]
    NotFound(String),

    /// Database error.
    #[error("Database error: {0}")]
    Database(String),

    /// A stored column could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Database(e.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Serialization(e.to_string())
    }
}

/// Trait for aggregate storage backends.
///
/// Every write is keyed by the normalized title and is atomic with
/// respect to other writes on the same store.
pub trait BookStore: Send + Sync {
    /// Insert a new record or merge into the existing one.
    fn upsert(&self, upsert: BookUpsert) -> Result<ReconcileEvent, StoreError>;

    /// Add one favorite to an existing title without touching comments.
    fn like(&self, title: &str) -> Result<ReconcileEvent, StoreError>;

    /// Append a comment and add one favorite to an existing title.
    fn add_reason(&self, title: &str, comment: &str) -> Result<ReconcileEvent, StoreError>;

    /// Get a record by (any casing of) its title.
    fn get(&self, title: &str) -> Result<Option<BookRecord>, StoreError>;

    /// Full read, filtered and ordered.
    fn list(&self, filter: &BookFilter) -> Result<Vec<BookRecord>, StoreError>;

    /// Number of records.
    fn count(&self) -> Result<i64, StoreError>;

    /// Reachability check; returns how many rows a one-row read saw.
    fn ping(&self) -> Result<usize, StoreError>;
}
