use anyhow::{Context, Result};
use async_nats::jetstream::{self, consumer::PullConsumer, Message};
use futures::{future::BoxFuture, StreamExt};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use wifiqr_domain::RecordOutcome;

/// Batch processor function handed to the consumer.
///
/// Takes the raw NATS messages of one fetched batch and returns one
/// `RecordOutcome` per message, in order. The processor owns
/// deserialization and business logic; the consumer only translates
/// outcomes into acknowledgments.
pub type BatchProcessor =
    Box<dyn Fn(&[Message]) -> BoxFuture<'static, Result<Vec<RecordOutcome>>> + Send + Sync>;

/// JetStream pull consumer that fetches message batches and
/// acknowledges them according to the per-record outcomes.
///
/// `Ok` and `DropPermanently` both ack (the record is consumed either
/// way), `RetryLater` naks so the stream redelivers the record.
pub struct NatsConsumer {
    consumer: PullConsumer,
    batch_size: usize,
    max_wait: Duration,
    processor: BatchProcessor,
}

impl NatsConsumer {
    pub async fn new(
        jetstream: &jetstream::Context,
        stream_name: &str,
        consumer_name: &str,
        subject_filter: &str,
        batch_size: usize,
        max_wait_secs: u64,
        processor: BatchProcessor,
    ) -> Result<Self> {
        debug!(
            stream = stream_name,
            consumer = consumer_name,
            subject = subject_filter,
            "creating JetStream consumer"
        );

        // Create or reuse the durable consumer
        let consumer = jetstream
            .create_consumer_on_stream(
                jetstream::consumer::pull::Config {
                    name: Some(consumer_name.to_string()),
                    durable_name: Some(consumer_name.to_string()),
                    filter_subject: subject_filter.to_string(),
                    ack_policy: jetstream::consumer::AckPolicy::Explicit,
                    ..Default::default()
                },
                stream_name,
            )
            .await
            .context("Failed to create consumer")?;

        info!(
            stream = stream_name,
            consumer = consumer_name,
            "consumer created"
        );

        Ok(Self {
            consumer,
            batch_size,
            max_wait: Duration::from_secs(max_wait_secs),
            processor,
        })
    }

    pub async fn run(&self, ctx: CancellationToken) -> Result<()> {
        info!("starting consumer loop");

        loop {
            tokio::select! {
                _ = ctx.cancelled() => {
                    info!("received shutdown signal, stopping consumer");
                    break;
                }
                result = self.fetch_and_process_batch() => {
                    if let Err(e) = result {
                        error!(error = %e, "error processing batch");
                        // Keep the loop alive; the queue redelivers
                        tokio::time::sleep(Duration::from_secs(1)).await;
                    }
                }
            }
        }

        info!("consumer stopped gracefully");
        Ok(())
    }

    async fn fetch_and_process_batch(&self) -> Result<()> {
        let mut messages = self
            .consumer
            .fetch()
            .max_messages(self.batch_size)
            .expires(self.max_wait)
            .messages()
            .await
            .context("Failed to fetch messages")?;

        let mut batch = Vec::new();
        while let Some(result) = messages.next().await {
            match result {
                Ok(msg) => batch.push(msg),
                Err(e) => {
                    warn!(error = %e, "error receiving message from batch");
                }
            }
        }

        if batch.is_empty() {
            return Ok(());
        }

        debug!(message_count = batch.len(), "received message batch");

        // Any processor-level error fails the whole batch: every
        // record stays in the stream for redelivery.
        let outcomes = match (self.processor)(&batch).await {
            Ok(outcomes) => outcomes,
            Err(e) => {
                error!(error = %e, "processor returned error, rejecting all messages");
                vec![RecordOutcome::RetryLater(e.to_string()); batch.len()]
            }
        };

        if outcomes.len() != batch.len() {
            error!(
                outcomes = outcomes.len(),
                messages = batch.len(),
                "processor returned wrong number of outcomes, rejecting all messages"
            );
            self.nak_all(&batch, "outcome count mismatch").await;
            return Ok(());
        }

        let (ack, nak) = split_outcomes(&outcomes);

        for idx in ack {
            if let Err(e) = batch[idx].ack().await {
                error!(error = %e, message_index = idx, "failed to acknowledge message");
            }
        }

        for (idx, reason) in nak {
            warn!(
                message_index = idx,
                subject = %batch[idx].subject,
                reason = %reason,
                "rejecting message for redelivery"
            );
            if let Err(e) = batch[idx].ack_with(jetstream::AckKind::Nak(None)).await {
                error!(error = %e, message_index = idx, "failed to nak message");
            }
        }

        Ok(())
    }

    async fn nak_all(&self, batch: &[Message], reason: &str) {
        for (idx, msg) in batch.iter().enumerate() {
            if let Err(e) = msg.ack_with(jetstream::AckKind::Nak(None)).await {
                error!(
                    error = %e,
                    message_index = idx,
                    reason = %reason,
                    "failed to nak message"
                );
            }
        }
    }
}

/// Partition per-record outcomes into ack indices and nak indices with
/// their retry reasons.
fn split_outcomes(outcomes: &[RecordOutcome]) -> (Vec<usize>, Vec<(usize, String)>) {
    let mut ack = Vec::new();
    let mut nak = Vec::new();

    for (idx, outcome) in outcomes.iter().enumerate() {
        match outcome {
            RecordOutcome::Ok | RecordOutcome::DropPermanently => ack.push(idx),
            RecordOutcome::RetryLater(reason) => nak.push((idx, reason.clone())),
        }
    }

    (ack, nak)
}
