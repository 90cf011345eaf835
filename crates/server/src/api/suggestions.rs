//! Title autocomplete handler.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SuggestionParams {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct SuggestionResponse {
    pub suggestions: Vec<String>,
}

/// GET /api/v1/suggestions?q=
///
/// Candidate titles for a partial input. Lookup failures yield an empty
/// list; debouncing is the caller's job.
pub async fn suggest(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SuggestionParams>,
) -> Json<SuggestionResponse> {
    let suggestions = state.resolver().suggest(&params.q).await;
    Json(SuggestionResponse { suggestions })
}
