//! Google Books volumes API client.
//!
//! An API key is optional; without one the public quota applies.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::types::VolumeRecord;
use super::{LookupError, MetadataLookup};
use crate::metrics::{EXTERNAL_SERVICE_DURATION, EXTERNAL_SERVICE_REQUESTS};

const DEFAULT_BASE_URL: &str = "https://www.googleapis.com/books/v1";

/// Google Books client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleBooksConfig {
    /// API key (optional).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL (default: https://www.googleapis.com/books/v1).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Request timeout in seconds (default: 10).
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for GoogleBooksConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: None,
            timeout_secs: default_timeout(),
        }
    }
}

fn default_timeout() -> u64 {
    10
}

/// Google Books API client.
pub struct GoogleBooksClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GoogleBooksClient {
    /// Create a new Google Books client.
    pub fn new(config: GoogleBooksConfig) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            api_key: config.api_key.filter(|k| !k.is_empty()),
        })
    }

    async fn fetch_volumes(&self, title: &str) -> Result<Vec<VolumeRecord>, LookupError> {
        let url = format!("{}/volumes", self.base_url);

        debug!("Google Books volume search: title='{}'", title);

        let mut request = self
            .client
            .get(&url)
            .query(&[("q", format!("intitle:{}", title))]);

        if let Some(ref key) = self.api_key {
            request = request.query(&[("key", key)]);
        }

        let response = request.send().await?;

        let status = response.status();
        if status == 429 {
            return Err(LookupError::RateLimitExceeded);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LookupError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let search_result: VolumesResponse = response.json().await.map_err(|e| {
            LookupError::ParseError(format!("Failed to parse volumes response: {}", e))
        })?;

        Ok(search_result.into_records())
    }
}

#[async_trait]
impl MetadataLookup for GoogleBooksClient {
    fn name(&self) -> &str {
        "google_books"
    }

    async fn search_volumes(&self, title: &str) -> Result<Vec<VolumeRecord>, LookupError> {
        let start = Instant::now();
        let result = self.fetch_volumes(title).await;

        EXTERNAL_SERVICE_DURATION
            .with_label_values(&["google_books", "search_volumes"])
            .observe(start.elapsed().as_secs_f64());
        EXTERNAL_SERVICE_REQUESTS
            .with_label_values(&[
                "google_books",
                "search_volumes",
                if result.is_ok() { "success" } else { "error" },
            ])
            .inc();

        result
    }
}

// ============================================================================
// Google Books API response types (internal)
// ============================================================================

#[derive(Debug, Deserialize)]
struct VolumesResponse {
    #[serde(default)]
    items: Option<Vec<serde_json::Value>>,
}

impl VolumesResponse {
    /// Items that don't fit the expected shape are kept as empty records.
    fn into_records(self) -> Vec<VolumeRecord> {
        self.items
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, item)| match serde_json::from_value::<GoogleVolume>(item) {
                Ok(volume) => volume.into(),
                Err(e) => {
                    warn!("Malformed volume at position {}: {}", index, e);
                    VolumeRecord::default()
                }
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVolume {
    #[serde(default)]
    volume_info: Option<GoogleVolumeInfo>,
    #[serde(default)]
    sale_info: Option<GoogleSaleInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleVolumeInfo {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    categories: Option<Vec<String>>,
    #[serde(default)]
    image_links: Option<GoogleImageLinks>,
}

#[derive(Debug, Deserialize)]
struct GoogleImageLinks {
    #[serde(default)]
    thumbnail: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoogleSaleInfo {
    #[serde(default)]
    buy_link: Option<String>,
}

impl From<GoogleVolume> for VolumeRecord {
    fn from(v: GoogleVolume) -> Self {
        let info = v.volume_info;
        let (title, description, categories, thumbnail_url) = match info {
            Some(i) => (
                i.title,
                i.description,
                i.categories.unwrap_or_default(),
                i.image_links.and_then(|l| l.thumbnail),
            ),
            None => (None, None, Vec::new(), None),
        };

        Self {
            title,
            description,
            categories,
            thumbnail_url,
            buy_link: v.sale_info.and_then(|s| s.buy_link),
        }
    }
}
