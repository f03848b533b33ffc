//! Structured ticket produced by enrichment.

mod types;

pub use types::{Priority, Ticket};
