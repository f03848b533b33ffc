//! Enrichment pipeline runner.

use bytes::Bytes;
use futures::StreamExt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, Mutex, Semaphore};
use tokio::task::{JoinHandle, JoinSet};
use tracing::{error, info, warn};

use crate::bus::{BusMessage, MessageBus, MessageStream};
use crate::config::{BusConfig, PipelineConfig};
use crate::enrichment::{truncate_for_log, Enricher, EnrichmentError};
use crate::metrics::{
    ENRICHMENTS_IN_FLIGHT, ENRICHMENT_DURATION, ENRICHMENT_OUTCOMES, MESSAGES_RECEIVED,
};

use super::types::{DropReason, MessageOutcome, PipelineError, PipelineStatus};

/// How much of a complaint is echoed into outcome logs.
const LOGGED_COMPLAINT_BYTES: usize = 200;

/// How much of a rejected generation output is echoed into logs.
const LOGGED_OUTPUT_BYTES: usize = 2048;

#[derive(Default)]
struct PipelineStats {
    received: AtomicU64,
    published: AtomicU64,
    dropped: AtomicU64,
    in_flight: AtomicU64,
}

/// Everything a per-message task needs. Cheap to clone.
#[derive(Clone)]
struct MessageHandler {
    bus: Arc<dyn MessageBus>,
    enricher: Arc<Enricher>,
    enriched_subject: String,
    semaphore: Arc<Semaphore>,
    stats: Arc<PipelineStats>,
}

impl MessageHandler {
    /// Drive one message to a terminal outcome.
    ///
    /// Never fails: every error becomes a `Dropped` outcome.
    async fn handle(&self, message: BusMessage) -> MessageOutcome {
        let start = Instant::now();
        self.stats.in_flight.fetch_add(1, Ordering::Relaxed);
        ENRICHMENTS_IN_FLIGHT.inc();

        let raw = message.text();
        let outcome = {
            // The semaphore is never closed, so acquiring only waits.
            let _permit = self.semaphore.acquire().await.ok();
            self.enrich_and_publish(&raw).await
        };

        self.stats.in_flight.fetch_sub(1, Ordering::Relaxed);
        ENRICHMENTS_IN_FLIGHT.dec();
        self.record(&raw, &outcome, start);
        outcome
    }

    async fn enrich_and_publish(&self, raw: &str) -> MessageOutcome {
        let ticket = match self.enricher.enrich(raw).await {
            Ok(ticket) => ticket,
            Err(e) => return MessageOutcome::Dropped(DropReason::Enrichment(e)),
        };

        let payload = match ticket.to_payload() {
            Ok(payload) => payload,
            Err(e) => return MessageOutcome::Dropped(DropReason::Serialization(e.to_string())),
        };

        match self
            .bus
            .publish(&self.enriched_subject, Bytes::from(payload))
            .await
        {
            Ok(()) => MessageOutcome::Published(ticket),
            Err(e) => MessageOutcome::Dropped(DropReason::Publish(e)),
        }
    }

    /// Update counters and emit the single outcome log entry for a message.
    fn record(&self, raw: &str, outcome: &MessageOutcome, start: Instant) {
        let label = outcome.label();
        ENRICHMENT_OUTCOMES.with_label_values(&[label]).inc();
        ENRICHMENT_DURATION
            .with_label_values(&[label])
            .observe(start.elapsed().as_secs_f64());

        let complaint = truncate_for_log(raw, LOGGED_COMPLAINT_BYTES);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match outcome {
            MessageOutcome::Published(ticket) => {
                self.stats.published.fetch_add(1, Ordering::Relaxed);
                info!(
                    outcome = label,
                    subject = %self.enriched_subject,
                    title = %ticket.title,
                    priority = %ticket.priority,
                    elapsed_ms,
                    %complaint,
                    "Published enriched ticket"
                );
            }
            MessageOutcome::Dropped(DropReason::Enrichment(EnrichmentError::MalformedOutput {
                reason,
                raw: output,
            })) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    outcome = label,
                    %reason,
                    output = %truncate_for_log(output, LOGGED_OUTPUT_BYTES),
                    elapsed_ms,
                    %complaint,
                    "Dropped message: generation output is not a valid ticket"
                );
            }
            MessageOutcome::Dropped(reason) => {
                self.stats.dropped.fetch_add(1, Ordering::Relaxed);
                warn!(
                    outcome = label,
                    error = %reason,
                    elapsed_ms,
                    %complaint,
                    "Dropped message"
                );
            }
        }
    }
}

/// Subscribes to raw complaints, enriches each one in its own task and
/// republishes the resulting tickets.
///
/// At most `max_concurrent` enrichments run at once; further messages wait
/// for a slot inside their own task, so the subscription keeps draining.
/// Outcomes are independent: a failing message never affects its siblings,
/// and no ordering between raw and enriched messages is preserved.
pub struct EnrichmentPipeline {
    raw_subject: String,
    max_concurrent: usize,
    handler: MessageHandler,
    running: Arc<AtomicBool>,
    shutdown_tx: broadcast::Sender<()>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
}

impl EnrichmentPipeline {
    /// Creates a new pipeline. Nothing is subscribed until [`start`](Self::start).
    pub fn new(
        config: &PipelineConfig,
        bus_config: &BusConfig,
        bus: Arc<dyn MessageBus>,
        enricher: Arc<Enricher>,
    ) -> Self {
        let max_concurrent = config.max_concurrent.max(1);
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            raw_subject: bus_config.raw_subject.clone(),
            max_concurrent,
            handler: MessageHandler {
                bus,
                enricher,
                enriched_subject: bus_config.enriched_subject.clone(),
                semaphore: Arc::new(Semaphore::new(max_concurrent)),
                stats: Arc::new(PipelineStats::default()),
            },
            running: Arc::new(AtomicBool::new(false)),
            shutdown_tx,
            dispatcher: Mutex::new(None),
        }
    }

    /// Subscribe to the raw subject and start dispatching messages.
    ///
    /// A rejected subscription is returned as
    /// [`PipelineError::SubscriptionFailed`]; callers should treat it as fatal.
    pub async fn start(&self) -> Result<(), PipelineError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(PipelineError::AlreadyRunning);
        }

        let messages = match self.handler.bus.subscribe(&self.raw_subject).await {
            Ok(messages) => messages,
            Err(source) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(PipelineError::SubscriptionFailed {
                    subject: self.raw_subject.clone(),
                    source,
                });
            }
        };

        info!(
            bus = self.handler.bus.name(),
            subject = %self.raw_subject,
            max_concurrent = self.max_concurrent,
            model = self.handler.enricher.model(),
            "Subscribed to raw messages"
        );

        let handle = tokio::spawn(Self::dispatch(
            messages,
            self.handler.clone(),
            self.shutdown_tx.subscribe(),
            Arc::clone(&self.running),
        ));
        *self.dispatcher.lock().await = Some(handle);

        Ok(())
    }

    /// Stop accepting messages and wait for in-flight ones to finish.
    pub async fn stop(&self) {
        let _ = self.shutdown_tx.send(());

        let Some(handle) = self.dispatcher.lock().await.take() else {
            warn!("Pipeline not running");
            return;
        };

        if let Err(e) = handle.await {
            error!(error = %e, "Pipeline dispatcher panicked");
        }
        self.running.store(false, Ordering::SeqCst);
        info!("Pipeline stopped");
    }

    /// Process one raw payload directly, without going through the
    /// subscription. Counts towards the pipeline statistics.
    pub async fn process_message(&self, payload: impl Into<Bytes>) -> MessageOutcome {
        self.handler.stats.received.fetch_add(1, Ordering::Relaxed);
        MESSAGES_RECEIVED.inc();
        self.handler
            .handle(BusMessage::new(self.raw_subject.clone(), payload))
            .await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Returns the current pipeline status.
    pub fn status(&self) -> PipelineStatus {
        let stats = &self.handler.stats;
        PipelineStatus {
            running: self.is_running(),
            raw_subject: self.raw_subject.clone(),
            enriched_subject: self.handler.enriched_subject.clone(),
            max_concurrent: self.max_concurrent,
            received: stats.received.load(Ordering::Relaxed),
            published: stats.published.load(Ordering::Relaxed),
            dropped: stats.dropped.load(Ordering::Relaxed),
            in_flight: stats.in_flight.load(Ordering::Relaxed),
        }
    }

    async fn dispatch(
        mut messages: MessageStream,
        handler: MessageHandler,
        mut shutdown_rx: broadcast::Receiver<()>,
        running: Arc<AtomicBool>,
    ) {
        let mut tasks: JoinSet<MessageOutcome> = JoinSet::new();

        loop {
            tokio::select! {
                _ = shutdown_rx.recv() => {
                    info!("Pipeline dispatcher received shutdown signal");
                    break;
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "Message task panicked");
                    }
                }
                next = messages.next() => match next {
                    Some(message) => {
                        handler.stats.received.fetch_add(1, Ordering::Relaxed);
                        MESSAGES_RECEIVED.inc();
                        let handler = handler.clone();
                        tasks.spawn(async move { handler.handle(message).await });
                    }
                    None => {
                        warn!("Raw message subscription closed");
                        break;
                    }
                }
            }
        }

        if !tasks.is_empty() {
            info!(pending = tasks.len(), "Waiting for in-flight messages");
        }
        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!(error = %e, "Message task panicked");
            }
        }

        running.store(false, Ordering::SeqCst);
    }
}
