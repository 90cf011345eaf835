use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::classifier::ClassifierPolicy;
use crate::metadata::GoogleBooksConfig;
use crate::quality::QualityPolicy;

/// Root configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Metadata lookup settings (public endpoint without a key when absent)
    #[serde(default)]
    pub catalog: Option<GoogleBooksConfig>,
    #[serde(default)]
    pub enrichment: EnrichmentConfig,
    #[serde(default)]
    pub quality: QualityPolicy,
    #[serde(default)]
    pub classifier: ClassifierPolicy,
    #[serde(default)]
    pub suggestions: SuggestionConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("favereads.db")
}

/// How resolved metadata is turned into display fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnrichmentConfig {
    /// Cover used when the catalog has no thumbnail.
    #[serde(default = "default_thumbnail")]
    pub default_thumbnail: String,
    /// Display name given to the catalog's purchase link.
    #[serde(default = "default_purchase_link_name")]
    pub purchase_link_name: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            default_thumbnail: default_thumbnail(),
            purchase_link_name: default_purchase_link_name(),
        }
    }
}

fn default_thumbnail() -> String {
    "/default-cover.jpg".to_string()
}

fn default_purchase_link_name() -> String {
    "Amazon".to_string()
}

/// Title autocomplete settings
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SuggestionConfig {
    /// Input quiescence required before a lookup fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Maximum distinct titles returned.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_results: default_max_results(),
        }
    }
}

/// Lower bound for `debounce_ms`.
pub const MIN_DEBOUNCE_MS: u64 = 400;

fn default_debounce_ms() -> u64 {
    MIN_DEBOUNCE_MS
}

fn default_max_results() -> usize {
    5
}

/// Sanitized config for API responses (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub catalog: SanitizedCatalogConfig,
    pub enrichment: EnrichmentConfig,
    pub quality: SanitizedQualityConfig,
    pub classifier: SanitizedClassifierConfig,
    pub suggestions: SuggestionConfig,
}

/// Catalog config with the API key hidden
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedCatalogConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    pub api_key_configured: bool,
}

/// Quality thresholds without the deny-list contents
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedQualityConfig {
    pub min_length: usize,
    pub short_length: usize,
    pub deny_list_size: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct SanitizedClassifierConfig {
    pub default_band: String,
    pub rule_names: Vec<String>,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            catalog: SanitizedCatalogConfig {
                base_url: config.catalog.as_ref().and_then(|c| c.base_url.clone()),
                api_key_configured: config
                    .catalog
                    .as_ref()
                    .and_then(|c| c.api_key.as_ref())
                    .is_some_and(|k| !k.is_empty()),
            },
            enrichment: config.enrichment.clone(),
            quality: SanitizedQualityConfig {
                min_length: config.quality.min_length,
                short_length: config.quality.short_length,
                deny_list_size: config.quality.deny_list.len(),
            },
            classifier: SanitizedClassifierConfig {
                default_band: config.classifier.default_band.to_string(),
                rule_names: config
                    .classifier
                    .rules
                    .iter()
                    .map(|r| r.name.clone())
                    .collect(),
            },
            suggestions: config.suggestions.clone(),
        }
    }
}
