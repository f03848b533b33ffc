//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - The enrichment pipeline (received messages, outcomes, duration, in-flight)
//! - The generation service (requests, tokens)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Pipeline Metrics
// =============================================================================

/// Raw messages delivered to the pipeline.
pub static MESSAGES_RECEIVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "supportai_messages_received_total",
        "Total raw messages delivered to the enrichment pipeline",
    )
    .unwrap()
});

/// Per-message outcomes.
pub static ENRICHMENT_OUTCOMES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "supportai_enrichment_outcomes_total",
            "Enrichment outcomes per processed message",
        ),
        // "published", "transport_failure", "malformed_output",
        // "serialization_failure", "publish_failure"
        &["outcome"],
    )
    .unwrap()
});

/// Time from message receipt to outcome.
pub static ENRICHMENT_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "supportai_enrichment_duration_seconds",
            "Duration of enrichment per message, including waiting for a worker slot",
        )
        .buckets(vec![0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0]),
        &["outcome"],
    )
    .unwrap()
});

/// Messages currently being enriched.
pub static ENRICHMENTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "supportai_enrichments_in_flight",
        "Messages currently held by a pipeline worker",
    )
    .unwrap()
});

// =============================================================================
// Generation Service Metrics
// =============================================================================

/// Generation requests by result.
pub static LLM_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "supportai_llm_requests_total",
            "Total generation service requests",
        ),
        &["result"], // "ok", "http_error", "api_error", "invalid_response", "timeout"
    )
    .unwrap()
});

/// Tokens reported by the generation service.
pub static LLM_TOKENS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("supportai_llm_tokens_total", "Total LLM tokens used"),
        &["direction"], // "input", "output"
    )
    .unwrap()
});

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Pipeline
        Box::new(MESSAGES_RECEIVED.clone()),
        Box::new(ENRICHMENT_OUTCOMES.clone()),
        Box::new(ENRICHMENT_DURATION.clone()),
        Box::new(ENRICHMENTS_IN_FLIGHT.clone()),
        // Generation service
        Box::new(LLM_REQUESTS.clone()),
        Box::new(LLM_TOKENS.clone()),
    ]
}
