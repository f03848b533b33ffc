//! In-memory message bus for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Notify, RwLock};

use crate::bus::{BusError, BusMessage, MessageBus, MessageStream};

/// Mock implementation of the MessageBus trait.
///
/// Delivers published messages to every live subscription on the exact same
/// subject, and records every successful publish for assertions. Failures can
/// be injected for subscribing and for publishing to chosen subjects.
///
/// # Example
///
/// ```rust,ignore
/// use supportai_core::testing::MockBus;
///
/// let bus = MockBus::new();
/// bus.fail_publishes_to("support.enriched").await;
/// let published = bus.published_to("support.raw").await;
/// ```
#[derive(Debug, Default)]
pub struct MockBus {
    subscribers: Arc<RwLock<HashMap<String, Vec<mpsc::UnboundedSender<BusMessage>>>>>,
    published: Arc<RwLock<Vec<BusMessage>>>,
    subscribe_calls: Arc<RwLock<Vec<String>>>,
    fail_subscribe: Arc<RwLock<bool>>,
    failing_subjects: Arc<RwLock<HashSet<String>>>,
    publish_notify: Arc<Notify>,
}

impl MockBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `subscribe` fail (or succeed again).
    pub async fn fail_subscriptions(&self, fail: bool) {
        *self.fail_subscribe.write().await = fail;
    }

    /// Make every publish to `subject` fail.
    pub async fn fail_publishes_to(&self, subject: impl Into<String>) {
        self.failing_subjects.write().await.insert(subject.into());
    }

    /// Every message successfully published, in publish order.
    pub async fn published(&self) -> Vec<BusMessage> {
        self.published.read().await.clone()
    }

    /// Messages successfully published to `subject`, in publish order.
    pub async fn published_to(&self, subject: &str) -> Vec<BusMessage> {
        self.published
            .read()
            .await
            .iter()
            .filter(|m| m.subject == subject)
            .cloned()
            .collect()
    }

    /// Subjects passed to `subscribe`, including failed attempts.
    pub async fn subscribe_calls(&self) -> Vec<String> {
        self.subscribe_calls.read().await.clone()
    }

    /// Number of live subscriptions on `subject`.
    pub async fn subscriber_count(&self, subject: &str) -> usize {
        self.subscribers
            .read()
            .await
            .get(subject)
            .map(|senders| senders.iter().filter(|tx| !tx.is_closed()).count())
            .unwrap_or(0)
    }

    /// Wait until at least `count` messages have been published to `subject`.
    ///
    /// Returns whatever was published when the count is reached or the
    /// timeout expires.
    pub async fn wait_for_published(
        &self,
        subject: &str,
        count: usize,
        timeout: Duration,
    ) -> Vec<BusMessage> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let notified = self.publish_notify.notified();
            let current = self.published_to(subject).await;
            if current.len() >= count {
                return current;
            }
            if tokio::time::timeout_at(deadline, notified).await.is_err() {
                return self.published_to(subject).await;
            }
        }
    }
}

#[async_trait]
impl MessageBus for MockBus {
    fn name(&self) -> &str {
        "mock"
    }

    async fn subscribe(&self, subject: &str) -> Result<MessageStream, BusError> {
        self.subscribe_calls.write().await.push(subject.to_string());

        if *self.fail_subscribe.read().await {
            return Err(BusError::SubscribeFailed {
                subject: subject.to_string(),
                message: "mock subscription rejected".to_string(),
            });
        }

        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers
            .write()
            .await
            .entry(subject.to_string())
            .or_default()
            .push(tx);

        Ok(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|msg| (msg, rx))
        })
        .boxed())
    }

    async fn publish(&self, subject: &str, payload: Bytes) -> Result<(), BusError> {
        if self.failing_subjects.read().await.contains(subject) {
            return Err(BusError::PublishFailed {
                subject: subject.to_string(),
                message: "mock publish rejected".to_string(),
            });
        }

        let message = BusMessage::new(subject, payload);
        self.published.write().await.push(message.clone());

        if let Some(senders) = self.subscribers.write().await.get_mut(subject) {
            senders.retain(|tx| tx.send(message.clone()).is_ok());
        }

        self.publish_notify.notify_waiters();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_reaches_subscriber() {
        let bus = MockBus::new();
        let mut stream = bus.subscribe("a").await.unwrap();

        bus.publish("a", Bytes::from_static(b"hello")).await.unwrap();
        bus.publish("b", Bytes::from_static(b"other")).await.unwrap();

        let msg = stream.next().await.unwrap();
        assert_eq!(msg, BusMessage::new("a", Bytes::from_static(b"hello")));
        assert_eq!(bus.published().await.len(), 2);
        assert_eq!(bus.published_to("b").await.len(), 1);
    }

    #[tokio::test]
    async fn test_failing_publish_is_not_recorded() {
        let bus = MockBus::new();
        bus.fail_publishes_to("a").await;

        let result = bus.publish("a", Bytes::from_static(b"x")).await;
        assert!(matches!(result, Err(BusError::PublishFailed { .. })));
        assert!(bus.published().await.is_empty());
    }

    #[test]
    fn test_subscribe_failure_is_recorded() {
        tokio_test::block_on(async {
            let bus = MockBus::new();
            bus.fail_subscriptions(true).await;
            assert!(bus.subscribe("a").await.is_err());
            assert_eq!(bus.subscribe_calls().await, vec!["a".to_string()]);
            assert_eq!(bus.subscriber_count("a").await, 0);
        });
    }

    #[tokio::test]
    async fn test_wait_for_published_times_out() {
        let bus = MockBus::new();
        let published = bus
            .wait_for_published("a", 1, Duration::from_millis(20))
            .await;
        assert!(published.is_empty());
    }
}
