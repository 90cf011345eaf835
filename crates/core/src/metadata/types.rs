//! Types for catalog records and resolved metadata.

use serde::{Deserialize, Serialize};

/// One catalog search hit, with every field optional.
///
/// Malformed provider records become a `VolumeRecord` with absent fields
/// rather than an error, so "first result" keeps its meaning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buy_link: Option<String>,
}

impl VolumeRecord {
    /// Trimmed title, if present and non-blank.
    pub fn usable_title(&self) -> Option<&str> {
        self.title
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// Canonical metadata for a verified title.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedMetadata {
    pub canonical_title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub categories: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_url: Option<String>,
}

impl ResolvedMetadata {
    /// Build from a catalog record; `None` when the record has no usable title.
    pub fn from_record(record: &VolumeRecord) -> Option<Self> {
        let canonical_title = record.usable_title()?.to_string();
        Some(Self {
            canonical_title,
            description: record.description.clone().unwrap_or_default(),
            categories: record.categories.clone(),
            thumbnail_url: record.thumbnail_url.clone().filter(|u| !u.is_empty()),
            purchase_url: record.buy_link.clone().filter(|u| !u.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_title_rejects_blank() {
        let record = VolumeRecord {
            title: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(record.usable_title(), None);
        assert!(ResolvedMetadata::from_record(&record).is_none());
    }

    #[test]
    fn test_from_record_fills_defaults() {
        let record = VolumeRecord {
            title: Some(" Where the Wild Things Are ".to_string()),
            thumbnail_url: Some(String::new()),
            ..Default::default()
        };
        let metadata = ResolvedMetadata::from_record(&record).unwrap();
        assert_eq!(metadata.canonical_title, "Where the Wild Things Are");
        assert_eq!(metadata.description, "");
        assert!(metadata.categories.is_empty());
        assert!(metadata.thumbnail_url.is_none());
        assert!(metadata.purchase_url.is_none());
    }
}
