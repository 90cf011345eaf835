//! Mock metadata lookup for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::metadata::{LookupError, MetadataLookup, VolumeRecord};

/// Mock implementation of the MetadataLookup trait.
///
/// Provides controllable behavior for testing:
/// - Return configurable volume records
/// - Track queries for assertions
/// - Simulate failures and per-query latency
///
/// # Example
///
/// ```rust,ignore
/// use favereads_core::testing::{MockMetadataLookup, fixtures};
///
/// let lookup = MockMetadataLookup::new();
/// lookup.add_volume(fixtures::volume("The Gruffalo", &["Juvenile Fiction"])).await;
///
/// let results = lookup.search_volumes("gruffalo").await?;
/// assert_eq!(results.len(), 1);
/// ```
#[derive(Debug)]
pub struct MockMetadataLookup {
    /// Volumes in provider order.
    volumes: Arc<RwLock<Vec<VolumeRecord>>>,
    /// Recorded queries.
    queries: Arc<RwLock<Vec<String>>>,
    /// Artificial latency by exact query.
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    /// If set, the next search will fail with this error.
    next_error: Arc<RwLock<Option<LookupError>>>,
}

impl Default for MockMetadataLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMetadataLookup {
    /// Create a new empty mock lookup.
    pub fn new() -> Self {
        Self {
            volumes: Arc::new(RwLock::new(Vec::new())),
            queries: Arc::new(RwLock::new(Vec::new())),
            delays: Arc::new(RwLock::new(HashMap::new())),
            next_error: Arc::new(RwLock::new(None)),
        }
    }

    /// Append a volume to the catalog.
    pub async fn add_volume(&self, volume: VolumeRecord) {
        self.volumes.write().await.push(volume);
    }

    /// Get all recorded queries.
    pub async fn recorded_queries(&self) -> Vec<String> {
        self.queries.read().await.clone()
    }

    pub async fn query_count(&self) -> usize {
        self.queries.read().await.len()
    }

    /// Configure the next search to fail with the given error.
    pub async fn fail_next(&self, error: LookupError) {
        *self.next_error.write().await = Some(error);
    }

    /// Delay responses to `query` by `delay`.
    pub async fn set_delay(&self, query: &str, delay: Duration) {
        self.delays.write().await.insert(query.to_string(), delay);
    }
}

#[async_trait]
impl MetadataLookup for MockMetadataLookup {
    fn name(&self) -> &str {
        "mock"
    }

    async fn search_volumes(&self, title: &str) -> Result<Vec<VolumeRecord>, LookupError> {
        if let Some(err) = self.next_error.write().await.take() {
            return Err(err);
        }

        self.queries.write().await.push(title.to_string());

        let delay = self.delays.read().await.get(title).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        // Title-contains search; records without a title always come back,
        // like a provider returning half-filled entries.
        let needle = title.to_lowercase();
        let volumes = self.volumes.read().await;
        Ok(volumes
            .iter()
            .filter(|v| {
                v.title
                    .as_deref()
                    .is_none_or(|t| t.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}
