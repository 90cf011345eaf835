//! Book list API handlers.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use favereads_core::{
    aggregate::age_buckets, AgeBand, BookFilter, BookRecord, Category, ReconcileEvent, SortOrder,
    SubmissionOutcome, SubmissionRequest,
};

use super::{ApiError, ApiJson, ErrorResponse};
use crate::state::AppState;

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct BookQueryParams {
    #[serde(default)]
    pub category: Option<String>,
    /// Coarse age bucket, e.g. `2–3` or `6+`.
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BookListResponse {
    pub books: Vec<BookRecord>,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct AgeBandParams {
    #[serde(default)]
    pub category: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgeBandsResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    pub bands: Vec<AgeBand>,
}

#[derive(Debug, Serialize)]
pub struct BookResponse {
    pub book: BookRecord,
    pub event: ReconcileEvent,
}

impl From<SubmissionOutcome> for BookResponse {
    fn from(outcome: SubmissionOutcome) -> Self {
        Self {
            book: outcome.record,
            event: outcome.event,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LikeRequest {
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub comment: String,
}

fn invalid_query(message: String) -> ApiError {
    ApiError(
        StatusCode::BAD_REQUEST,
        ErrorResponse::new("invalid-query", message),
    )
}

fn store_failure(e: impl std::fmt::Display) -> ApiError {
    ApiError(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorResponse::new("persistence-failed", e.to_string()),
    )
}

fn parse_category(raw: Option<&str>) -> Result<Option<Category>, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => Category::parse(s)
            .map(Some)
            .ok_or_else(|| invalid_query(format!("Unknown category: {}", s))),
    }
}

fn parse_sort(raw: Option<&str>) -> Result<SortOrder, ApiError> {
    match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
        None | Some("") | Some("recent") => Ok(SortOrder::Recent),
        Some("popular") => Ok(SortOrder::Popular),
        Some(other) => Err(invalid_query(format!("Unknown sort order: {}", other))),
    }
}

impl BookQueryParams {
    fn to_filter(&self) -> Result<BookFilter, ApiError> {
        let mut filter = BookFilter::new().with_sort(parse_sort(self.sort.as_deref())?);
        if let Some(category) = parse_category(self.category.as_deref())? {
            filter = filter.with_category(category);
        }
        if let Some(age) = self.age.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            filter = filter.with_age_bucket(AgeBand::new(age).bucket());
        }
        Ok(filter)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /api/v1/books
///
/// List books, newest first unless `sort=popular`.
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    Query(params): Query<BookQueryParams>,
) -> Result<Json<BookListResponse>, ApiError> {
    let filter = params.to_filter()?;
    let books = state.store().list(&filter).map_err(store_failure)?;
    let total = books.len();
    Ok(Json(BookListResponse { books, total }))
}

/// GET /api/v1/books/age-bands
///
/// Distinct age buckets present in a category.
pub async fn list_age_bands(
    State(state): State<Arc<AppState>>,
    Query(params): Query<AgeBandParams>,
) -> Result<Json<AgeBandsResponse>, ApiError> {
    let category = parse_category(params.category.as_deref())?;
    let books = state
        .store()
        .list(&BookFilter::new())
        .map_err(store_failure)?;
    let bands = age_buckets(&books, category);
    Ok(Json(AgeBandsResponse { category, bands }))
}

/// POST /api/v1/books
///
/// Submit a favorite book with a reason.
pub async fn submit_book(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<SubmissionRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let outcome = state.pipeline().submit(request).await?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/books/like
pub async fn like_book(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<LikeRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let outcome = state.pipeline().like(&request.title)?;
    Ok(Json(outcome.into()))
}

/// POST /api/v1/books/reasons
pub async fn add_reason(
    State(state): State<Arc<AppState>>,
    ApiJson(request): ApiJson<ReasonRequest>,
) -> Result<Json<BookResponse>, ApiError> {
    let outcome = state
        .pipeline()
        .add_reason(&request.title, &request.comment)?;
    Ok(Json(outcome.into()))
}
