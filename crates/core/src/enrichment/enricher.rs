//! Turns one raw complaint into one ticket.

use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use crate::ticket::Ticket;

use super::error::{truncate_for_log, EnrichmentError};
use super::llm::{CompletionRequest, LlmClient, LlmError};
use super::parse::decode_ticket;
use super::prompt::build_prompt;

/// Default cap on diagnostic text carried by transport errors.
pub const DEFAULT_MAX_ERROR_BODY_BYTES: usize = 512;

/// Enrichment client.
///
/// Performs exactly one generation call per [`Enricher::enrich`]; retrying is
/// left to the caller.
pub struct Enricher {
    client: Arc<dyn LlmClient>,
    timeout: Duration,
    max_error_body_bytes: usize,
}

impl Enricher {
    /// Create an enricher whose generation calls are bounded by `timeout`.
    pub fn new(client: Arc<dyn LlmClient>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            max_error_body_bytes: DEFAULT_MAX_ERROR_BODY_BYTES,
        }
    }

    pub fn with_max_error_body_bytes(mut self, max_bytes: usize) -> Self {
        self.max_error_body_bytes = max_bytes;
        self
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Enrich a raw complaint into a ticket.
    pub async fn enrich(&self, raw_message: &str) -> Result<Ticket, EnrichmentError> {
        let request = CompletionRequest::new(build_prompt(raw_message));

        let response = tokio::time::timeout(self.timeout, self.client.complete(request))
            .await
            .map_err(|_| self.transport_failure(LlmError::Timeout(self.timeout)))?
            .map_err(|e| self.transport_failure(e))?;

        debug!(
            provider = self.client.provider(),
            model = %response.model,
            output_tokens = response.usage.output_tokens,
            "Generation service responded"
        );

        decode_ticket(&response.text)
    }

    fn transport_failure(&self, error: LlmError) -> EnrichmentError {
        let status = match &error {
            LlmError::Api { status, .. } => Some(*status),
            _ => None,
        };
        EnrichmentError::TransportFailure {
            status,
            detail: truncate_for_log(&error.to_string(), self.max_error_body_bytes),
        }
    }
}
