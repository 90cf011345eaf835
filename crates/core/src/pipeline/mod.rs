//! The submission pipeline.
//!
//! One run per user action: validate the comment, resolve the title,
//! classify the audience, upsert into the store. Each run either reaches
//! `Reconciled` with the store-acknowledged record or stops in `Rejected`
//! or `Failed` without touching the aggregate.

mod types;

pub use types::{
    ResolutionError, SubmissionError, SubmissionOutcome, SubmissionRequest, SubmissionState,
    ValidationError,
};

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, error, info, warn};

use crate::aggregate::{Aggregate, BookStore, BookUpsert, PurchaseLink};
use crate::classifier::{AudienceClassifier, Category, PolicyError};
use crate::config::{Config, EnrichmentConfig};
use crate::metadata::{MetadataLookup, MetadataResolver, Resolution, ResolvedMetadata};
use crate::metrics::{CLASSIFICATIONS, LIKES_TOTAL, SUBMISSIONS_TOTAL, SUBMISSION_DURATION};
use crate::quality::{QualityGate, QualityVerdict};

/// Sequential Gate → Resolve → Classify → Persist runner.
pub struct SubmissionPipeline {
    resolver: MetadataResolver,
    gate: QualityGate,
    classifier: AudienceClassifier,
    store: Arc<dyn BookStore>,
    enrichment: EnrichmentConfig,
}

impl SubmissionPipeline {
    pub fn new(
        resolver: MetadataResolver,
        gate: QualityGate,
        classifier: AudienceClassifier,
        store: Arc<dyn BookStore>,
        enrichment: EnrichmentConfig,
    ) -> Self {
        Self {
            resolver,
            gate,
            classifier,
            store,
            enrichment,
        }
    }

    /// Build a pipeline from configuration around a catalog and a store.
    pub fn from_config(
        config: &Config,
        lookup: Arc<dyn MetadataLookup>,
        store: Arc<dyn BookStore>,
    ) -> Result<Self, PolicyError> {
        Ok(Self::new(
            MetadataResolver::new(lookup).with_max_suggestions(config.suggestions.max_results),
            QualityGate::new(config.quality.clone())?,
            AudienceClassifier::new(config.classifier.clone())?,
            store,
            config.enrichment.clone(),
        ))
    }

    pub fn resolver(&self) -> &MetadataResolver {
        &self.resolver
    }

    pub fn store(&self) -> &Arc<dyn BookStore> {
        &self.store
    }

    /// Run one submission to completion.
    pub async fn submit(
        &self,
        request: SubmissionRequest,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let start = Instant::now();
        let enriched = if request.is_pre_enriched() {
            "pre_enriched"
        } else {
            "lookup"
        };

        let result = self.run(request).await;

        SUBMISSION_DURATION
            .with_label_values(&[enriched])
            .observe(start.elapsed().as_secs_f64());
        let outcome = match &result {
            Ok(o) if o.event.is_new() => "created",
            Ok(_) => "merged",
            Err(e) => e.kind(),
        };
        SUBMISSIONS_TOTAL.with_label_values(&[outcome]).inc();

        result
    }

    async fn run(&self, request: SubmissionRequest) -> Result<SubmissionOutcome, SubmissionError> {
        let title = request.title.trim().to_string();
        transition(&title, SubmissionState::Validating);
        self.validate(&title, &request.comment)
            .inspect_err(|e| reject(&title, e))?;

        let upsert = if let Some(age_band) = request.supplied_age_band() {
            debug!(title = %title, "Using caller-supplied enrichment");
            BookUpsert {
                title: title.clone(),
                comment: request.comment.trim().to_string(),
                age_band,
                category: Category::from_kids_flag(request.is_kids_book.unwrap_or(true)),
                thumbnail_url: Some(
                    request
                        .thumbnail_url
                        .filter(|u| !u.trim().is_empty())
                        .unwrap_or_else(|| self.enrichment.default_thumbnail.clone()),
                ),
                purchase_links: request.purchase_links.unwrap_or_default(),
            }
        } else {
            transition(&title, SubmissionState::Resolving);
            let metadata = self.resolve(&title).await?;

            transition(&title, SubmissionState::Classifying);
            let classification = self.classifier.classify(&metadata, &request.comment);
            CLASSIFICATIONS
                .with_label_values(&[classification.age_band.as_str()])
                .inc();
            debug!(
                title = %title,
                band = %classification.age_band,
                kids = classification.is_kids_book,
                rule = classification.matched_rule.as_deref().unwrap_or("default"),
                "Classified"
            );

            BookUpsert {
                title: title.clone(),
                comment: request.comment.trim().to_string(),
                category: classification.category(),
                age_band: classification.age_band,
                thumbnail_url: Some(self.thumbnail_for(&metadata)),
                purchase_links: self.links_for(&metadata),
            }
        };

        transition(&title, SubmissionState::Persisting);
        let event = self.store.upsert(upsert).map_err(|e| {
            error!(title = %title, error = %e, "Failed to persist submission");
            SubmissionError::from(e)
        })?;

        transition(&title, SubmissionState::Reconciled);
        info!(
            title = %title,
            favorites = event.record().favorites,
            new = event.is_new(),
            "Submission accepted"
        );
        Ok(SubmissionOutcome::from_event(event))
    }

    /// Add one favorite to an existing title.
    pub fn like(&self, title: &str) -> Result<SubmissionOutcome, SubmissionError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }

        let event = self.store.like(title).inspect_err(|e| {
            warn!(title = %title, error = %e, "Like failed");
        })?;
        LIKES_TOTAL.inc();
        info!(title = %title, favorites = event.record().favorites, "Liked");
        Ok(SubmissionOutcome::from_event(event))
    }

    /// Attach another reason to an existing title. The comment is gated;
    /// no catalog lookup happens.
    pub fn add_reason(
        &self,
        title: &str,
        comment: &str,
    ) -> Result<SubmissionOutcome, SubmissionError> {
        let title = title.trim();
        self.validate(title, comment)
            .inspect_err(|e| reject(title, e))?;

        let result = self
            .store
            .add_reason(title, comment.trim())
            .map(SubmissionOutcome::from_event)
            .map_err(SubmissionError::from);

        let outcome = match &result {
            Ok(_) => "merged",
            Err(e) => {
                warn!(title = %title, error = %e, "Adding reason failed");
                e.kind()
            }
        };
        SUBMISSIONS_TOTAL.with_label_values(&[outcome]).inc();
        result
    }

    fn validate(&self, title: &str, comment: &str) -> Result<(), SubmissionError> {
        if title.is_empty() {
            return Err(ValidationError::MissingField("title").into());
        }
        if comment.trim().is_empty() {
            return Err(ValidationError::MissingField("comment").into());
        }
        match self.gate.check(comment) {
            QualityVerdict::Accepted => Ok(()),
            QualityVerdict::Rejected(reason) => {
                Err(ValidationError::CommentRejected(reason).into())
            }
        }
    }

    async fn resolve(&self, title: &str) -> Result<ResolvedMetadata, SubmissionError> {
        let resolution = self.resolver.resolve(title).await.map_err(|e| {
            warn!(title = %title, error = %e, "Resolution failed");
            SubmissionError::from(ResolutionError::Lookup(e))
        })?;

        match resolution {
            Resolution::Resolved(metadata) => Ok(metadata),
            Resolution::Unresolved => {
                warn!(title = %title, "Title could not be verified");
                Err(ResolutionError::Unverified(title.to_string()).into())
            }
        }
    }

    fn thumbnail_for(&self, metadata: &ResolvedMetadata) -> String {
        metadata
            .thumbnail_url
            .clone()
            .unwrap_or_else(|| self.enrichment.default_thumbnail.clone())
    }

    fn links_for(&self, metadata: &ResolvedMetadata) -> Vec<PurchaseLink> {
        metadata
            .purchase_url
            .iter()
            .map(|url| PurchaseLink {
                name: self.enrichment.purchase_link_name.clone(),
                url: url.clone(),
            })
            .collect()
    }
}

fn transition(title: &str, state: SubmissionState) {
    debug!(title = %title, state = %state, "Submission state");
}

fn reject(title: &str, error: &SubmissionError) {
    warn!(title = %title, kind = error.kind(), "Submission rejected: {}", error);
}

/// Fold a pipeline outcome into a client-side aggregate.
pub fn apply_outcome(aggregate: &mut Aggregate, outcome: &SubmissionOutcome) {
    aggregate.apply(&outcome.event);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::MemoryBookStore;
    use crate::classifier::AgeBand;
    use crate::metadata::LookupError;
    use crate::quality::RejectionReason;
    use crate::testing::{fixtures, FailingBookStore, MockMetadataLookup};
    use tokio_test::{assert_err, assert_ok};

    struct Harness {
        lookup: Arc<MockMetadataLookup>,
        store: Arc<MemoryBookStore>,
        pipeline: SubmissionPipeline,
    }

    fn harness() -> Harness {
        let lookup = Arc::new(MockMetadataLookup::new());
        let store = Arc::new(MemoryBookStore::new());
        let pipeline = SubmissionPipeline::from_config(
            &Config::default(),
            Arc::clone(&lookup) as Arc<dyn MetadataLookup>,
            Arc::clone(&store) as Arc<dyn BookStore>,
        )
        .unwrap();
        Harness {
            lookup,
            store,
            pipeline,
        }
    }

    #[tokio::test]
    async fn test_submit_resolves_and_classifies() {
        let h = harness();
        let mut volume = fixtures::volume("Goodnight Moon", &["Juvenile Fiction / Nursery"]);
        volume.buy_link = Some("https://buy.example/moon".to_string());
        h.lookup.add_volume(volume).await;

        let outcome = h
            .pipeline
            .submit(SubmissionRequest::new(
                "goodnight moon",
                "The quiet rhythm puts everyone to sleep",
            ))
            .await
            .unwrap();

        let record = &outcome.record;
        assert!(outcome.event.is_new());
        assert_eq!(record.title, "goodnight moon");
        assert_eq!(record.age_band.as_str(), "2–3");
        assert_eq!(record.category, Category::Kids);
        assert_eq!(
            record.thumbnail_url.as_deref(),
            Some("http://books.example/goodnight-moon.jpg")
        );
        assert_eq!(
            record.purchase_links,
            vec![fixtures::link("Amazon", "https://buy.example/moon")]
        );
    }

    #[tokio::test]
    async fn test_submit_uses_default_thumbnail() {
        let h = harness();
        let mut volume = fixtures::volume("Corduroy", &[]);
        volume.thumbnail_url = None;
        h.lookup.add_volume(volume).await;

        let outcome = h
            .pipeline
            .submit(SubmissionRequest::new("Corduroy", "The bear looking for his button"))
            .await
            .unwrap();
        assert_eq!(outcome.record.thumbnail_url.as_deref(), Some("/default-cover.jpg"));
        assert!(outcome.record.purchase_links.is_empty());
    }

    #[tokio::test]
    async fn test_rejected_comment_skips_lookup() {
        let h = harness();
        let err = h
            .pipeline
            .submit(SubmissionRequest::new("asdf", "nice"))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "comment-rejected");
        assert!(matches!(
            err,
            SubmissionError::Validation(ValidationError::CommentRejected(
                RejectionReason::TooShort { .. }
            ))
        ));
        assert_eq!(h.lookup.query_count().await, 0);
        assert_eq!(h.store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_missing_fields() {
        let h = harness();
        let err = h
            .pipeline
            .submit(SubmissionRequest::new("  ", "A perfectly fine reason here"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Validation(ValidationError::MissingField("title"))
        ));

        let err = h
            .pipeline
            .submit(SubmissionRequest::new("Corduroy", ""))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            SubmissionError::Validation(ValidationError::MissingField("comment"))
        ));
    }

    #[tokio::test]
    async fn test_unverified_title_not_persisted() {
        let h = harness();
        let err = h
            .pipeline
            .submit(SubmissionRequest::new("Zzyzx Qwop", "I made this one up myself"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "verification-failed");
        assert_eq!(err.state(), SubmissionState::Rejected);
        assert_eq!(h.store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_lookup_failure_not_persisted() {
        let h = harness();
        h.lookup
            .fail_next(LookupError::Unavailable("offline".to_string()))
            .await;
        let err = h
            .pipeline
            .submit(SubmissionRequest::new("Corduroy", "The bear looking for his button"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "lookup-failed");
        assert_eq!(h.store.count().unwrap(), 0);
    }

    #[tokio::test]
    async fn test_pre_enriched_skips_lookup() {
        let h = harness();
        let request = SubmissionRequest {
            age_band: Some(AgeBand::new("6+")),
            purchase_links: Some(vec![fixtures::link("Shop", "https://shop")]),
            ..SubmissionRequest::new("Matilda", "She reads everything, just like my son")
        };

        let outcome = h.pipeline.submit(request).await.unwrap();
        assert_eq!(h.lookup.query_count().await, 0);
        assert_eq!(outcome.record.age_band.as_str(), "6+");
        assert_eq!(outcome.record.category, Category::Kids);
        assert_eq!(outcome.record.thumbnail_url.as_deref(), Some("/default-cover.jpg"));
        assert_eq!(outcome.record.purchase_links.len(), 1);
    }

    #[tokio::test]
    async fn test_blank_age_band_falls_back_to_classifier() {
        let h = harness();
        h.lookup
            .add_volume(fixtures::volume("Matilda", &["Juvenile Fiction / Nursery"]))
            .await;
        let request = SubmissionRequest {
            age_band: Some(AgeBand::new("  ")),
            ..SubmissionRequest::new("Matilda", "She reads everything, just like my son")
        };

        let outcome = h.pipeline.submit(request).await.unwrap();
        assert_eq!(h.lookup.query_count().await, 1);
        assert_eq!(outcome.record.age_band.as_str(), "2–3");
        assert!(!outcome.record.age_band.as_str().trim().is_empty());
    }

    #[tokio::test]
    async fn test_pre_enriched_still_gated() {
        let h = harness();
        let request = SubmissionRequest {
            age_band: Some(AgeBand::new("6+")),
            ..SubmissionRequest::new("Matilda", "boring")
        };
        let err = h.pipeline.submit(request).await.unwrap_err();
        assert_eq!(err.kind(), "comment-rejected");
    }

    #[tokio::test]
    async fn test_pre_enriched_adult_flag() {
        let h = harness();
        let request = SubmissionRequest {
            age_band: Some(AgeBand::new("12+")),
            is_kids_book: Some(false),
            ..SubmissionRequest::new("Clean Code", "Changed how I name every variable")
        };
        let outcome = h.pipeline.submit(request).await.unwrap();
        assert_eq!(outcome.record.category, Category::Other);
    }

    #[tokio::test]
    async fn test_persistence_failure() {
        let lookup = Arc::new(MockMetadataLookup::new());
        lookup.add_volume(fixtures::volume("Corduroy", &[])).await;
        let pipeline = SubmissionPipeline::from_config(
            &Config::default(),
            lookup,
            Arc::new(FailingBookStore::default()),
        )
        .unwrap();

        let err = pipeline
            .submit(SubmissionRequest::new("Corduroy", "The bear looking for his button"))
            .await
            .unwrap_err();
        assert_eq!(err.kind(), "persistence-failed");
    }

    #[tokio::test]
    async fn test_like_and_add_reason() {
        let h = harness();
        h.lookup.add_volume(fixtures::volume("Corduroy", &[])).await;
        h.pipeline
            .submit(SubmissionRequest::new("Corduroy", "The bear looking for his button"))
            .await
            .unwrap();

        let liked = assert_ok!(h.pipeline.like("CORDUROY"));
        assert_eq!(liked.record.favorites, 2);
        assert_eq!(liked.record.comments.len(), 1);

        let reason = assert_ok!(h
            .pipeline
            .add_reason("corduroy", "We visit the department store now"));
        assert_eq!(reason.record.favorites, 3);
        assert_eq!(reason.record.comments.len(), 2);
        // Adding a reason never consults the catalog.
        assert_eq!(h.lookup.query_count().await, 1);

        let err = assert_err!(h.pipeline.add_reason("corduroy", "ok"));
        assert_eq!(err.kind(), "comment-rejected");
    }

    #[tokio::test]
    async fn test_like_unknown_title() {
        let h = harness();
        assert_eq!(h.pipeline.like("ghost").unwrap_err().kind(), "not-found");
        assert_eq!(
            h.pipeline
                .add_reason("ghost", "Nobody has heard of this one yet")
                .unwrap_err()
                .kind(),
            "not-found"
        );
        assert_eq!(h.pipeline.like(" ").unwrap_err().kind(), "missing-field");
    }

    #[tokio::test]
    async fn test_outcomes_keep_local_aggregate_convergent() {
        let h = harness();
        h.lookup.add_volume(fixtures::volume("Corduroy", &[])).await;
        let mut local = Aggregate::new();

        let first = h
            .pipeline
            .submit(SubmissionRequest::new("Corduroy", "The bear looking for his button"))
            .await
            .unwrap();
        apply_outcome(&mut local, &first);
        let second = h.pipeline.like("corduroy").unwrap();
        apply_outcome(&mut local, &second);
        apply_outcome(&mut local, &second);

        assert_eq!(local.records(), h.store.snapshot().unwrap().records());
    }
}
