//! Message bus abstraction.

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;
use thiserror::Error;

/// Errors that can occur talking to the message bus.
#[derive(Debug, Error)]
pub enum BusError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Subscribe to '{subject}' failed: {message}")]
    SubscribeFailed { subject: String, message: String },

    #[error("Publish to '{subject}' failed: {message}")]
    PublishFailed { subject: String, message: String },
}

/// A message delivered by the bus.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusMessage {
    pub subject: String,
    pub payload: Bytes,
}

impl BusMessage {
    pub fn new(subject: impl Into<String>, payload: impl Into<Bytes>) -> Self {
        Self {
            subject: subject.into(),
            payload: payload.into(),
        }
    }

    /// Payload as text; invalid UTF-8 sequences are replaced.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.payload).into_owned()
    }
}

/// Stream of messages for one subscription. Ends when the subscription closes.
pub type MessageStream = BoxStream<'static, BusMessage>;

/// Publish/subscribe bus handle.
///
/// Implementations are shared across tasks; `publish` may be called
/// concurrently.
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Backend name for logging (e.g., "nats").
    fn name(&self) -> &str;

    /// Subscribe to a subject.
    async fn subscribe(&self, subject: &str) -> Result<MessageStream, BusError>;

    /// Publish a payload to a subject.
    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError>;
}
