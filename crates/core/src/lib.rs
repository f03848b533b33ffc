pub mod bus;
pub mod config;
pub mod enrichment;
pub mod metrics;
pub mod pipeline;
pub mod testing;
pub mod ticket;

pub use bus::{subscribe_enriched, BusError, BusMessage, MessageBus, MessageStream, NatsBus};
pub use config::{
    load_config, load_config_from_str, load_config_or_default, validate_config, BusConfig,
    Config, ConfigError, LlmConfig, PipelineConfig, SanitizedConfig, ServerConfig,
};
pub use enrichment::{
    build_prompt, decode_ticket, strip_code_fence, CompletionRequest, CompletionResponse,
    Enricher, EnrichmentError, LlmClient, LlmError, LlmUsage, OllamaClient,
};
pub use pipeline::{DropReason, EnrichmentPipeline, MessageOutcome, PipelineError, PipelineStatus};
pub use ticket::{Priority, Ticket};
