//! Message pipeline: raw subject in, enriched subject out.
//!
//! Each delivered message moves through
//!
//! ```text
//! Received -> Enriching -> Published
//!                       \-> Dropped
//! ```
//!
//! `Dropped` is terminal for that message only. The only fatal error is a
//! rejected subscription at startup.

mod runner;
mod types;

pub use runner::EnrichmentPipeline;
pub use types::{DropReason, MessageOutcome, PipelineError, PipelineStatus};
