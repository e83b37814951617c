use std::sync::Arc;
use meditone_core::{Config, ContentStore, JobStore, PipelineOrchestrator, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    job_store: Arc<dyn JobStore>,
    content_store: Arc<dyn ContentStore>,
    orchestrator: Arc<PipelineOrchestrator>,
}

impl AppState {
    pub fn new(
        config: Config,
        job_store: Arc<dyn JobStore>,
        content_store: Arc<dyn ContentStore>,
        orchestrator: Arc<PipelineOrchestrator>,
    ) -> Self {
        Self {
            config,
            job_store,
            content_store,
            orchestrator,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn job_store(&self) -> &dyn JobStore {
        self.job_store.as_ref()
    }

    pub fn content_store(&self) -> &dyn ContentStore {
        self.content_store.as_ref()
    }

    pub fn orchestrator(&self) -> &PipelineOrchestrator {
        &self.orchestrator
    }
}
