//! Prometheus metrics for observability.
//!
//! This module provides metrics for monitoring the favereads server:
//! - HTTP request metrics (latency, counts, errors)
//! - Aggregate size (collected dynamically)

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

use favereads_core::{BookFilter, Category};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "favereads_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("favereads_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "favereads_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

// =============================================================================
// Aggregate Metrics (collected dynamically)
// =============================================================================

/// Distinct titles in the shared list.
pub static AGGREGATE_RECORDS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "favereads_aggregate_records",
        "Number of distinct books in the shared list",
    )
    .unwrap()
});

/// Books by display category.
pub static BOOKS_BY_CATEGORY: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("favereads_books_by_category", "Current book count by category"),
        &["category"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    // HTTP
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();

    // Aggregate
    registry
        .register(Box::new(AGGREGATE_RECORDS.clone()))
        .unwrap();
    registry
        .register(Box::new(BOOKS_BY_CATEGORY.clone()))
        .unwrap();

    // Core metrics (pipeline, metadata, external services)
    for metric in favereads_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
    }
    String::from_utf8_lossy(&buffer).into_owned()
}

/// Collect dynamic metrics from current application state.
///
/// Store errors leave the previous gauge values in place.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    let store = state.store();

    if let Ok(count) = store.count() {
        AGGREGATE_RECORDS.set(count);
    }

    for category in [Category::Kids, Category::Other] {
        let filter = BookFilter::new().with_category(category);
        if let Ok(books) = store.list(&filter) {
            BOOKS_BY_CATEGORY
                .with_label_values(&[category.as_str()])
                .set(books.len() as i64);
        }
    }
}

/// Label for a request path: the matched route template, or a fixed
/// placeholder so unknown paths cannot blow up label cardinality.
pub fn path_label(matched: Option<&str>) -> String {
    matched.unwrap_or("unmatched").to_string()
}
