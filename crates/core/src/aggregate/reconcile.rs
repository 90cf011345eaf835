//! The merge rule and the client-local projection of the aggregate.

use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::types::{
    age_buckets, normalize_title, BookFilter, BookRecord, BookUpsert, ReconcileEvent,
};
use crate::classifier::{AgeBand, Category};

/// Ordered list of records, most recently created first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregate {
    records: Vec<BookRecord>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a full read of the store (already newest first).
    pub fn from_records(records: Vec<BookRecord>) -> Self {
        Self { records }
    }

    pub fn records(&self) -> &[BookRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, title: &str) -> Option<&BookRecord> {
        let key = normalize_title(title);
        self.records.iter().find(|r| r.key() == key)
    }

    fn position(&self, key: &str) -> Option<usize> {
        self.records.iter().position(|r| r.key() == key)
    }

    pub fn list(&self, filter: &BookFilter) -> Vec<BookRecord> {
        filter.select(&self.records)
    }

    pub fn age_buckets(&self, category: Option<Category>) -> Vec<AgeBand> {
        age_buckets(&self.records, category)
    }

    /// Fold a store-acknowledged event into this local copy.
    ///
    /// `Created` prepends the record unless the title is already present.
    /// `Merged` takes favorites and comments from the acknowledged record,
    /// keeping the local record's position and first-write fields; a title
    /// this copy never saw is prepended. Re-applying an event changes
    /// nothing, and an event older than the local copy is ignored since
    /// acknowledged favorites only grow.
    pub fn apply(&mut self, event: &ReconcileEvent) {
        let incoming = event.record();
        match self.position(&incoming.key()) {
            Some(index) => {
                let local = &mut self.records[index];
                if incoming.favorites < local.favorites {
                    return;
                }
                local.favorites = incoming.favorites;
                local.comments = incoming.comments.clone();
                local.updated_at = incoming.updated_at;
            }
            None => self.records.insert(0, incoming.clone()),
        }
    }
}

/// Merge one submission into the aggregate.
///
/// A new normalized title is prepended with one favorite and the
/// submitted comment. An existing title gets the comment appended and one
/// more favorite; band, category, thumbnail and links stay as first written.
pub fn reconcile(mut aggregate: Aggregate, upsert: &BookUpsert) -> (Aggregate, ReconcileEvent) {
    match aggregate.position(&upsert.key()) {
        Some(index) => {
            let record = &mut aggregate.records[index];
            record.comments.push(upsert.comment.clone());
            record.favorites += 1;
            record.updated_at = Utc::now();
            let event = ReconcileEvent::Merged(record.clone());
            (aggregate, event)
        }
        None => {
            let record = BookRecord::from_upsert(upsert);
            aggregate.records.insert(0, record.clone());
            (aggregate, ReconcileEvent::Created(record))
        }
    }
}

/// Add a favorite (and optionally a comment) to an existing title.
///
/// Returns `None` for the event when the title is unknown.
pub fn reconcile_favorite(
    mut aggregate: Aggregate,
    title: &str,
    comment: Option<&str>,
) -> (Aggregate, Option<ReconcileEvent>) {
    let Some(index) = aggregate.position(&normalize_title(title)) else {
        return (aggregate, None);
    };

    let record = &mut aggregate.records[index];
    if let Some(comment) = comment {
        record.comments.push(comment.to_string());
    }
    record.favorites += 1;
    record.updated_at = Utc::now();
    let event = ReconcileEvent::Merged(record.clone());
    (aggregate, Some(event))
}
