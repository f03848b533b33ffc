//! Enrichment: raw complaint text in, structured [`Ticket`](crate::Ticket) out.
//!
//! ```text
//! raw text -> build_prompt -> LlmClient::complete -> strip_code_fence -> decode_ticket
//! ```
//!
//! Transport problems (unreachable service, timeout, non-2xx) surface as
//! [`EnrichmentError::TransportFailure`] before any decoding happens. Text
//! that is not a complete ticket surfaces as
//! [`EnrichmentError::MalformedOutput`].

mod enricher;
mod error;
mod llm;
mod parse;
mod prompt;

pub use enricher::{Enricher, DEFAULT_MAX_ERROR_BODY_BYTES};
pub use error::{truncate_for_log, EnrichmentError};
pub use llm::{
    CompletionRequest, CompletionResponse, LlmClient, LlmError, LlmUsage, OllamaClient,
};
pub use parse::{decode_ticket, strip_code_fence};
pub use prompt::build_prompt;
