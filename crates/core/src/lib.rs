pub mod aggregate;
pub mod classifier;
pub mod config;
pub mod metadata;
pub mod metrics;
pub mod pipeline;
pub mod policy;
pub mod quality;
pub mod suggest;
pub mod testing;

pub use aggregate::{
    reconcile, Aggregate, BookFilter, BookRecord, BookStore, BookUpsert, MemoryBookStore,
    PurchaseLink, ReconcileEvent, SortOrder, SqliteBookStore, StoreError,
};
pub use classifier::{AgeBand, AudienceClassifier, Category, Classification, ClassifierPolicy};
pub use config::{
    load_config, load_config_from_str, validate_config, Config, ConfigError, SanitizedConfig,
};
pub use metadata::{
    GoogleBooksClient, GoogleBooksConfig, LookupError, MetadataLookup, MetadataResolver,
    Resolution, ResolvedMetadata, VolumeRecord,
};
pub use pipeline::{
    SubmissionError, SubmissionOutcome, SubmissionPipeline, SubmissionRequest, SubmissionState,
};
pub use policy::PolicyError;
pub use quality::{QualityGate, QualityPolicy, QualityVerdict, RejectionReason};
pub use suggest::SuggestionSession;
