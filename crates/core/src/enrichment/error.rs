//! Error types for enrichment.

use thiserror::Error;

/// Why a complaint could not be turned into a ticket.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// The generation service was unreachable, timed out, or answered with a
    /// non-success status. No decoding was attempted.
    #[error("Generation service transport failure{}: {detail}", format_status(.status))]
    TransportFailure {
        status: Option<u16>,
        /// Diagnostic detail, truncated
        detail: String,
    },

    /// The service answered but the generated text is not a valid ticket.
    #[error("Malformed generation output: {reason}")]
    MalformedOutput {
        reason: String,
        /// The generated text as received
        raw: String,
    },
}

impl EnrichmentError {
    /// Short machine-readable label, used for metrics and logs.
    pub fn label(&self) -> &'static str {
        match self {
            EnrichmentError::TransportFailure { .. } => "transport_failure",
            EnrichmentError::MalformedOutput { .. } => "malformed_output",
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        matches!(self, EnrichmentError::TransportFailure { .. })
    }

    pub fn is_malformed_output(&self) -> bool {
        matches!(self, EnrichmentError::MalformedOutput { .. })
    }
}

fn format_status(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (status {code})"),
        None => String::new(),
    }
}

/// Cut `text` to at most `max_bytes`, respecting char boundaries.
pub fn truncate_for_log(text: &str, max_bytes: usize) -> String {
    if text.len() <= max_bytes {
        return text.to_string();
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... ({} bytes total)", &text[..end], text.len())
}
