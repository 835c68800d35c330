use crate::consumer::BatchProcessor;
use async_nats::jetstream::Message;
use std::sync::Arc;
use tracing::info;
use wifiqr_domain::{QueueRecord, WifiQrCreatedService};

/// Create a `BatchProcessor` that routes WiFi QR created records
/// through the domain service, one at a time.
pub fn create_wifi_qr_processor(service: Arc<WifiQrCreatedService>) -> BatchProcessor {
    Box::new(move |messages: &[Message]| {
        let service = Arc::clone(&service);

        // Copy out payloads and ids before the async block; Message
        // borrows from the slice.
        let records: Vec<QueueRecord> = messages
            .iter()
            .map(|msg| QueueRecord {
                message_id: record_id(msg),
                body: msg.payload.to_vec(),
            })
            .collect();

        Box::pin(async move {
            info!(record_count = records.len(), "processing batch of queue records");

            let mut outcomes = Vec::with_capacity(records.len());
            for record in &records {
                outcomes.push(service.handle_record(record).await);
            }

            Ok(outcomes)
        })
    })
}

/// Stable identifier for a record: the stream sequence survives
/// redeliveries. Falls back to the subject when ack info is missing.
fn record_id(msg: &Message) -> String {
    msg.info()
        .map(|info| info.stream_sequence.to_string())
        .unwrap_or_else(|_| msg.subject.to_string())
}

// Unit tests for the processor would need real NATS Message values,
// which cannot be constructed without a live connection. The outcome
// translation it feeds is covered in consumer.rs and the per-record
// semantics in wifiqr-domain's service tests.
