//! Types for the enrichment pipeline.

use serde::Serialize;

use crate::bus::BusError;
use crate::enrichment::EnrichmentError;
use crate::ticket::Ticket;

/// Errors that stop the pipeline from running at all.
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// The raw subject subscription was rejected; no work can ever arrive.
    #[error("Subscription to '{subject}' failed: {source}")]
    SubscriptionFailed {
        subject: String,
        #[source]
        source: BusError,
    },

    #[error("Pipeline is already running")]
    AlreadyRunning,
}

/// Why a message was dropped.
#[derive(Debug, thiserror::Error)]
pub enum DropReason {
    #[error(transparent)]
    Enrichment(#[from] EnrichmentError),

    #[error("Ticket serialization failed: {0}")]
    Serialization(String),

    #[error(transparent)]
    Publish(BusError),
}

impl DropReason {
    /// Metric/log label for this reason.
    pub fn label(&self) -> &'static str {
        match self {
            DropReason::Enrichment(e) => e.label(),
            DropReason::Serialization(_) => "serialization_failure",
            DropReason::Publish(_) => "publish_failure",
        }
    }
}

/// Terminal state of one message.
#[derive(Debug)]
pub enum MessageOutcome {
    /// The enriched ticket was published.
    Published(Ticket),
    /// Enrichment or publish failed; nothing was published.
    Dropped(DropReason),
}

impl MessageOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            MessageOutcome::Published(_) => "published",
            MessageOutcome::Dropped(reason) => reason.label(),
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, MessageOutcome::Published(_))
    }
}

/// Snapshot of pipeline counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PipelineStatus {
    pub running: bool,
    pub raw_subject: String,
    pub enriched_subject: String,
    pub max_concurrent: usize,
    /// Messages delivered by the bus
    pub received: u64,
    pub published: u64,
    pub dropped: u64,
    /// Messages waiting for or holding a worker slot
    pub in_flight: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drop_reason_labels() {
        let transport = DropReason::from(EnrichmentError::TransportFailure {
            status: Some(500),
            detail: String::new(),
        });
        assert_eq!(transport.label(), "transport_failure");

        let malformed = DropReason::from(EnrichmentError::MalformedOutput {
            reason: String::new(),
            raw: String::new(),
        });
        assert_eq!(malformed.label(), "malformed_output");

        let publish = DropReason::Publish(BusError::PublishFailed {
            subject: "s".to_string(),
            message: "m".to_string(),
        });
        assert_eq!(publish.label(), "publish_failure");
        assert_eq!(
            MessageOutcome::Dropped(publish).label(),
            "publish_failure"
        );
    }
}
