//! Title resolution and autocomplete on top of a [`MetadataLookup`].

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, warn};

use super::{LookupError, MetadataLookup, ResolvedMetadata};
use crate::metrics::{METADATA_RESOLUTIONS, SUGGESTION_LOOKUPS};

/// Outcome of resolving a title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedMetadata),
    /// No result, or the first result has no usable title.
    Unresolved,
}

/// Resolves free-text titles into canonical metadata.
#[derive(Clone)]
pub struct MetadataResolver {
    lookup: Arc<dyn MetadataLookup>,
    max_suggestions: usize,
}

impl MetadataResolver {
    pub fn new(lookup: Arc<dyn MetadataLookup>) -> Self {
        Self {
            lookup,
            max_suggestions: 5,
        }
    }

    pub fn with_max_suggestions(mut self, max: usize) -> Self {
        self.max_suggestions = max;
        self
    }

    /// Resolve a title against the catalog, taking the first result.
    ///
    /// A blank title resolves to `Unresolved` without a lookup. Transport
    /// and provider failures are returned as errors; they are never
    /// turned into partial metadata.
    pub async fn resolve(&self, title: &str) -> Result<Resolution, LookupError> {
        let title = title.trim();
        if title.is_empty() {
            return Ok(Resolution::Unresolved);
        }

        let records = self.lookup.search_volumes(title).await.inspect_err(|e| {
            METADATA_RESOLUTIONS.with_label_values(&["error"]).inc();
            warn!("Metadata lookup for '{}' failed: {}", title, e);
        })?;

        let resolution = records
            .first()
            .and_then(ResolvedMetadata::from_record)
            .map(Resolution::Resolved)
            .unwrap_or(Resolution::Unresolved);

        match &resolution {
            Resolution::Resolved(m) => {
                METADATA_RESOLUTIONS.with_label_values(&["resolved"]).inc();
                debug!("Resolved '{}' as '{}'", title, m.canonical_title);
            }
            Resolution::Unresolved => {
                METADATA_RESOLUTIONS.with_label_values(&["unresolved"]).inc();
                debug!("Title '{}' could not be verified", title);
            }
        }

        Ok(resolution)
    }

    /// Candidate titles for a partial input, or the lookup error.
    ///
    /// Titles are de-duplicated case-insensitively in provider order and
    /// capped at the configured maximum.
    pub async fn try_suggest(&self, partial: &str) -> Result<Vec<String>, LookupError> {
        let partial = partial.trim();
        if partial.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.lookup.search_volumes(partial).await?;

        let mut seen = HashSet::new();
        let suggestions = records
            .iter()
            .filter_map(|r| r.usable_title())
            .filter(|t| seen.insert(t.to_lowercase()))
            .take(self.max_suggestions)
            .map(String::from)
            .collect();

        Ok(suggestions)
    }

    /// Advisory suggestions; failures degrade to an empty list.
    pub async fn suggest(&self, partial: &str) -> Vec<String> {
        match self.try_suggest(partial).await {
            Ok(suggestions) => {
                SUGGESTION_LOOKUPS.with_label_values(&["success"]).inc();
                suggestions
            }
            Err(e) => {
                SUGGESTION_LOOKUPS.with_label_values(&["error"]).inc();
                warn!("Suggestion lookup for '{}' failed: {}", partial, e);
                Vec::new()
            }
        }
    }
}
