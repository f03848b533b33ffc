use std::sync::Arc;
use supportai_core::{Config, EnrichmentPipeline, MessageBus, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    bus: Arc<dyn MessageBus>,
    pipeline: Option<Arc<EnrichmentPipeline>>,
}

impl AppState {
    pub fn new(
        config: Config,
        bus: Arc<dyn MessageBus>,
        pipeline: Option<Arc<EnrichmentPipeline>>,
    ) -> Self {
        Self {
            config,
            bus,
            pipeline,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn bus(&self) -> &dyn MessageBus {
        self.bus.as_ref()
    }

    /// Subject the ingress publishes raw complaints to.
    pub fn raw_subject(&self) -> &str {
        &self.config.bus.raw_subject
    }

    pub fn pipeline(&self) -> Option<&Arc<EnrichmentPipeline>> {
        self.pipeline.as_ref()
    }
}
