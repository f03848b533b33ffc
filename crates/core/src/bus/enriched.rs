//! Consumer-side helper for the enriched ticket stream.

use futures::stream::{BoxStream, StreamExt};
use tracing::{info, warn};

use crate::ticket::Ticket;

use super::traits::{BusError, MessageBus};

/// Subscribe to the enriched subject and yield decoded tickets.
///
/// Payloads that are not valid tickets are logged and skipped; the stream
/// keeps going.
pub async fn subscribe_enriched(
    bus: &dyn MessageBus,
    subject: &str,
) -> Result<BoxStream<'static, Ticket>, BusError> {
    let messages = bus.subscribe(subject).await?;
    info!(subject, "Subscribed to enriched tickets");

    Ok(messages
        .filter_map(|msg| async move {
            match Ticket::from_payload(&msg.payload) {
                Ok(ticket) => Some(ticket),
                Err(e) => {
                    warn!(subject = %msg.subject, error = %e, "Unable to decode enriched ticket");
                    None
                }
            }
        })
        .boxed())
}
