//! NATS implementation of [`MessageBus`].

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use tracing::info;

use crate::config::BusConfig;

use super::traits::{BusError, BusMessage, MessageBus, MessageStream};

/// Core NATS bus handle. Cloning shares the underlying connection.
#[derive(Clone)]
pub struct NatsBus {
    client: async_nats::Client,
}

impl NatsBus {
    /// Connect to the server named in the config.
    pub async fn connect(config: &BusConfig) -> Result<Self, BusError> {
        let client = async_nats::ConnectOptions::new()
            .name(&config.connection_name)
            .connect(config.url.as_str())
            .await
            .map_err(|e| BusError::ConnectionFailed(format!("{}: {}", config.url, e)))?;

        info!(connection = %config.connection_name, "Connected to NATS");
        Ok(Self { client })
    }

    /// Wrap an existing client.
    pub fn from_client(client: async_nats::Client) -> Self {
        Self { client }
    }

    /// Flush buffered publishes to the server.
    pub async fn flush(&self) -> Result<(), BusError> {
        self.client
            .flush()
            .await
            .map_err(|e| BusError::ConnectionFailed(format!("flush failed: {}", e)))
    }
}

#[async_trait]
impl MessageBus for NatsBus {
    fn name(&self) -> &str {
        "nats"
    }

    async fn subscribe(&self, subject: &str) -> Result<MessageStream, BusError> {
        let subscriber = self
            .client
            .subscribe(subject.to_string())
            .await
            .map_err(|e| BusError::SubscribeFailed {
                subject: subject.to_string(),
                message: e.to_string(),
            })?;

        Ok(subscriber
            .map(|msg| BusMessage {
                subject: msg.subject.to_string(),
                payload: msg.payload,
            })
            .boxed())
    }

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError> {
        self.client
            .publish(subject.to_string(), payload)
            .await
            .map_err(|e| BusError::PublishFailed {
                subject: subject.to_string(),
                message: e.to_string(),
            })
    }
}
