//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Submission pipeline (outcomes, likes, classifications)
//! - Metadata resolution and title suggestions
//! - External services (Google Books)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts};

// =============================================================================
// Submission Pipeline Metrics
// =============================================================================

/// Submissions total by outcome.
pub static SUBMISSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("favereads_submissions_total", "Total book submissions"),
        // "created", "merged", "missing-field", "comment-rejected",
        // "verification-failed", "lookup-failed", "persistence-failed", "not-found"
        &["outcome"],
    )
    .unwrap()
});

/// Likes applied to existing titles.
pub static LIKES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("favereads_likes_total", "Total likes applied").unwrap()
});

/// Classifications by assigned age band.
pub static CLASSIFICATIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "favereads_classifications_total",
            "Total audience classifications",
        ),
        &["band"],
    )
    .unwrap()
});

/// End-to-end submission duration in seconds.
pub static SUBMISSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "favereads_submission_duration_seconds",
            "Duration of the submission pipeline",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["enriched"], // "lookup", "pre_enriched"
    )
    .unwrap()
});

// =============================================================================
// Metadata Metrics
// =============================================================================

/// Title resolutions by result.
pub static METADATA_RESOLUTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "favereads_metadata_resolutions_total",
            "Total title resolutions",
        ),
        &["result"], // "resolved", "unresolved", "error"
    )
    .unwrap()
});

/// Suggestion lookups by result.
pub static SUGGESTION_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "favereads_suggestion_lookups_total",
            "Total title suggestion lookups",
        ),
        &["result"], // "success", "error", "superseded"
    )
    .unwrap()
});

// =============================================================================
// External Services Metrics
// =============================================================================

/// External service call duration.
pub static EXTERNAL_SERVICE_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "favereads_external_service_duration_seconds",
            "Duration of external service calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["service", "operation"],
    )
    .unwrap()
});

/// External service requests by status.
pub static EXTERNAL_SERVICE_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "favereads_external_service_requests_total",
            "Total external service requests",
        ),
        &["service", "operation", "status"], // status: "success", "error"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(SUBMISSIONS_TOTAL.clone()),
        Box::new(LIKES_TOTAL.clone()),
        Box::new(CLASSIFICATIONS.clone()),
        Box::new(SUBMISSION_DURATION.clone()),
        // Metadata
        Box::new(METADATA_RESOLUTIONS.clone()),
        Box::new(SUGGESTION_LOOKUPS.clone()),
        // External services
        Box::new(EXTERNAL_SERVICE_DURATION.clone()),
        Box::new(EXTERNAL_SERVICE_REQUESTS.clone()),
    ]
}
