//! Book metadata lookup and resolution.
//!
//! The external catalog is a black box keyed by title-contains search.
//! [`MetadataResolver`] turns its first result into [`ResolvedMetadata`]
//! (or an explicit `Unresolved`), and produces autocomplete suggestions.

mod google_books;
mod resolver;
mod types;

pub use google_books::{GoogleBooksClient, GoogleBooksConfig};
pub use resolver::{MetadataResolver, Resolution};
pub use types::{ResolvedMetadata, VolumeRecord};

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when talking to the metadata catalog.
#[derive(Debug, Error)]
pub enum LookupError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimitExceeded,

    /// API returned an error.
    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Catalog unreachable for a reason other than HTTP (used by test doubles).
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),
}

/// Trait for external book catalogs.
#[async_trait]
pub trait MetadataLookup: Send + Sync {
    /// Name of this catalog for logging/metrics.
    fn name(&self) -> &str;

    /// Search volumes whose title contains `title`, in provider relevance order.
    async fn search_volumes(&self, title: &str) -> Result<Vec<VolumeRecord>, LookupError>;
}
