//! Publish/subscribe transport between ingress, pipeline and consumers.

mod enriched;
mod nats;
mod traits;

pub use enriched::subscribe_enriched;
pub use nats::NatsBus;
pub use traits::{BusError, BusMessage, MessageBus, MessageStream};
