//! Ingress HTTP server and process wiring for the complaint enrichment service.

pub mod api;
pub mod metrics;
pub mod state;
