use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::classifier::{AgeBand, Category};

/// Dedup key for a title: trimmed and case-folded.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// A named place to buy a book.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PurchaseLink {
    pub name: String,
    pub url: String,
}

/// Drop repeated links, keeping first occurrences in order.
pub fn dedup_links(links: Vec<PurchaseLink>) -> Vec<PurchaseLink> {
    let mut out: Vec<PurchaseLink> = Vec::with_capacity(links.len());
    for link in links {
        if !out.contains(&link) {
            out.push(link);
        }
    }
    out
}

/// One entry of the shared list, unique per normalized title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookRecord {
    pub id: String,
    /// Title as first submitted (trimmed).
    pub title: String,
    /// Number of submissions plus likes; never below 1.
    pub favorites: u32,
    /// Reasons in submission order.
    pub comments: Vec<String>,
    pub age_band: AgeBand,
    pub category: Category,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub purchase_links: Vec<PurchaseLink>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BookRecord {
    /// First record for a title, created from a submission.
    pub fn from_upsert(upsert: &BookUpsert) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: upsert.title.trim().to_string(),
            favorites: 1,
            comments: vec![upsert.comment.clone()],
            age_band: upsert.age_band.clone(),
            category: upsert.category,
            thumbnail_url: upsert.thumbnail_url.clone(),
            purchase_links: dedup_links(upsert.purchase_links.clone()),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn key(&self) -> String {
        normalize_title(&self.title)
    }
}

/// A validated, classified submission ready to be folded into the aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookUpsert {
    pub title: String,
    pub comment: String,
    pub age_band: AgeBand,
    pub category: Category,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub purchase_links: Vec<PurchaseLink>,
}

impl BookUpsert {
    pub fn key(&self) -> String {
        normalize_title(&self.title)
    }
}

/// What happened to the aggregate, carrying the store-acknowledged record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "book", rename_all = "snake_case")]
pub enum ReconcileEvent {
    /// First submission of a title.
    Created(BookRecord),
    /// Existing title gained a favorite (and possibly a comment).
    Merged(BookRecord),
}

impl ReconcileEvent {
    pub fn record(&self) -> &BookRecord {
        match self {
            ReconcileEvent::Created(r) | ReconcileEvent::Merged(r) => r,
        }
    }

    pub fn is_new(&self) -> bool {
        matches!(self, ReconcileEvent::Created(_))
    }
}

/// Ordering for list reads.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    /// Most recently created first.
    #[default]
    Recent,
    /// Most favorites first, ties by recency.
    Popular,
}

/// Filter for list reads.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    pub category: Option<Category>,
    /// Coarse age bucket (see [`AgeBand::bucket`]).
    pub age_bucket: Option<AgeBand>,
    pub sort: SortOrder,
}

impl BookFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    pub fn with_age_bucket(mut self, bucket: AgeBand) -> Self {
        self.age_bucket = Some(bucket.bucket());
        self
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn matches(&self, record: &BookRecord) -> bool {
        self.category.is_none_or(|c| record.category == c)
            && self
                .age_bucket
                .as_ref()
                .is_none_or(|b| &record.age_band.bucket() == b)
    }

    /// Filter and order records given newest first.
    pub fn select<'a>(
        &self,
        newest_first: impl IntoIterator<Item = &'a BookRecord>,
    ) -> Vec<BookRecord> {
        let mut out: Vec<BookRecord> = newest_first
            .into_iter()
            .filter(|r| self.matches(r))
            .cloned()
            .collect();
        if self.sort == SortOrder::Popular {
            // Stable sort keeps recency among equal favorites.
            out.sort_by(|a, b| b.favorites.cmp(&a.favorites));
        }
        out
    }
}

/// Distinct display buckets among records of a category, in first-seen order.
pub fn age_buckets<'a>(
    records: impl IntoIterator<Item = &'a BookRecord>,
    category: Option<Category>,
) -> Vec<AgeBand> {
    let mut buckets: Vec<AgeBand> = Vec::new();
    for record in records {
        if category.is_some_and(|c| record.category != c) {
            continue;
        }
        let bucket = record.age_band.bucket();
        if !buckets.contains(&bucket) {
            buckets.push(bucket);
        }
    }
    buckets
}
