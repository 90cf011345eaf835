use std::sync::Arc;

use favereads_core::{BookStore, Config, MetadataResolver, SanitizedConfig, SubmissionPipeline};

/// Shared application state
pub struct AppState {
    config: Config,
    pipeline: Arc<SubmissionPipeline>,
}

impl AppState {
    pub fn new(config: Config, pipeline: Arc<SubmissionPipeline>) -> Self {
        Self { config, pipeline }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn pipeline(&self) -> &SubmissionPipeline {
        &self.pipeline
    }

    pub fn store(&self) -> &dyn BookStore {
        self.pipeline.store().as_ref()
    }

    pub fn resolver(&self) -> &MetadataResolver {
        self.pipeline.resolver()
    }
}
