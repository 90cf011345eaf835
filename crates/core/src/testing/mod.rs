//! Testing utilities and mock implementations.
//!
//! This module provides a mock catalog and a failing store, allowing
//! pipeline and API tests without network access or a broken database.
//!
//! # Example
//!
//! ```rust,ignore
//! use favereads_core::testing::{fixtures, MockMetadataLookup};
//!
//! let lookup = MockMetadataLookup::new();
//! lookup.add_volume(fixtures::volume("Corduroy", &["Juvenile Fiction"])).await;
//!
//! // Use in a SubmissionPipeline...
//! ```

mod failing_store;
mod mock_metadata_lookup;

pub use failing_store::FailingBookStore;
pub use mock_metadata_lookup::MockMetadataLookup;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::aggregate::{BookUpsert, PurchaseLink};
    use crate::classifier::{AgeBand, Category};
    use crate::metadata::{ResolvedMetadata, VolumeRecord};

    /// Create a catalog record with a title and categories.
    pub fn volume(title: &str, categories: &[&str]) -> VolumeRecord {
        VolumeRecord {
            title: Some(title.to_string()),
            description: None,
            categories: categories.iter().map(|c| c.to_string()).collect(),
            thumbnail_url: Some(format!(
                "http://books.example/{}.jpg",
                title.to_lowercase().replace(' ', "-")
            )),
            buy_link: None,
        }
    }

    /// Create a catalog record with a description.
    pub fn described_volume(title: &str, categories: &[&str], description: &str) -> VolumeRecord {
        VolumeRecord {
            description: Some(description.to_string()),
            ..volume(title, categories)
        }
    }

    /// Create resolved metadata directly.
    pub fn metadata(title: &str, categories: &[&str], description: &str) -> ResolvedMetadata {
        ResolvedMetadata {
            canonical_title: title.to_string(),
            description: description.to_string(),
            categories: categories.iter().map(|c| c.to_string()).collect(),
            thumbnail_url: None,
            purchase_url: None,
        }
    }

    /// Create a kids-category upsert for the given band.
    pub fn upsert(title: &str, comment: &str, band: &str) -> BookUpsert {
        BookUpsert {
            title: title.to_string(),
            comment: comment.to_string(),
            age_band: AgeBand::new(band),
            category: Category::Kids,
            thumbnail_url: None,
            purchase_links: Vec::new(),
        }
    }

    pub fn link(name: &str, url: &str) -> PurchaseLink {
        PurchaseLink {
            name: name.to_string(),
            url: url.to_string(),
        }
    }
}
