pub mod books;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod suggestions;

pub use routes::create_router;

use axum::{
    extract::{rejection::JsonRejection, FromRequest, Request},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;

use favereads_core::SubmissionError;

/// Structured error body: a message for people and a stable code for clients.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub kind: String,
}

impl ErrorResponse {
    pub fn new(kind: &str, error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            kind: kind.to_string(),
        }
    }
}

/// HTTP rendering of a pipeline error.
pub struct ApiError(pub StatusCode, pub ErrorResponse);

impl From<SubmissionError> for ApiError {
    fn from(e: SubmissionError) -> Self {
        let status = match e.kind() {
            "missing-field" | "comment-rejected" => StatusCode::BAD_REQUEST,
            "verification-failed" => StatusCode::UNPROCESSABLE_ENTITY,
            "lookup-failed" => StatusCode::BAD_GATEWAY,
            "not-found" => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, ErrorResponse::new(e.kind(), e.to_string()))
    }
}

/// Undecodable request bodies become `invalid-body`.
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection {
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::BAD_REQUEST
            }
            ref other => other.status(),
        };
        ApiError(status, ErrorResponse::new("invalid-body", rejection.body_text()))
    }
}

/// `Json` extractor whose rejections render as [`ErrorResponse`].
pub struct ApiJson<T>(pub T);

impl<T, S> FromRequest<S> for ApiJson<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(ApiJson(value))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.0, Json(self.1)).into_response()
    }
}
