use crate::error::{HandlerError, HandlerResult};
use crate::message::{QueueRecord, WifiQrCreatedMessage};
use crate::notification::NotificationStep;
use crate::outcome::RecordOutcome;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Domain service that handles one queue record end to end.
///
/// Flow:
/// 1. Parse the body as JSON; a syntactic failure is a poison record
/// 2. A `null` top-level value is dropped with a warning
/// 3. Deserialize into `WifiQrCreatedMessage`; any shape mismatch
///    (including non-object top-level JSON) is a poison record
/// 4. Run the notification steps in fixed order: email, analytics,
///    audit; the first failure aborts the rest
///
/// Outcomes map directly onto the queue's ack/nak semantics: poison
/// records are consumed so they never loop, step failures are handed
/// back for redelivery.
pub struct WifiQrCreatedService {
    steps: Vec<Arc<dyn NotificationStep>>,
}

impl WifiQrCreatedService {
    /// Create the service with the three notification capabilities in
    /// dispatch order.
    pub fn new(
        email: Arc<dyn NotificationStep>,
        analytics: Arc<dyn NotificationStep>,
        audit: Arc<dyn NotificationStep>,
    ) -> Self {
        Self {
            steps: vec![email, analytics, audit],
        }
    }

    /// Handle one record and report its disposition. Never panics and
    /// never returns an error: every failure mode is folded into the
    /// outcome so the caller only has to translate it.
    #[instrument(skip(self, record), fields(message_id = %record.message_id))]
    pub async fn handle_record(&self, record: &QueueRecord) -> RecordOutcome {
        info!(
            message_id = %record.message_id,
            body_size = record.body.len(),
            "processing queue record"
        );

        let message = match parse_message(&record.body) {
            Ok(message) => message,
            Err(HandlerError::EmptyPayload) => {
                warn!(
                    message_id = %record.message_id,
                    "record deserialized to null, dropping"
                );
                return RecordOutcome::DropPermanently;
            }
            Err(e) => {
                error!(
                    message_id = %record.message_id,
                    error = %e,
                    "record is not a valid WifiQrCreatedMessage, dropping"
                );
                return RecordOutcome::DropPermanently;
            }
        };

        info!(
            wifi_id = %message.wifi_id,
            ssid = %message.ssid,
            encryption = %message.encryption,
            created_at = %message.created_at,
            created_by = %message.created_by,
            "wifi qr code created"
        );

        match self.process(&message).await {
            Ok(()) => {
                info!(
                    message_id = %record.message_id,
                    wifi_id = %message.wifi_id,
                    "successfully processed record"
                );
                RecordOutcome::Ok
            }
            Err(e) => {
                error!(
                    message_id = %record.message_id,
                    wifi_id = %message.wifi_id,
                    error = %e,
                    "notification dispatch failed, record will be redelivered"
                );
                RecordOutcome::RetryLater(e.to_string())
            }
        }
    }

    /// Invoke every notification step in order, stopping at the first
    /// failure. Step errors are attributed to the failing step.
    pub async fn process(&self, message: &WifiQrCreatedMessage) -> HandlerResult<()> {
        for step in &self.steps {
            step.perform(message)
                .await
                .map_err(|source| HandlerError::NotificationFailed {
                    step: step.name(),
                    source,
                })?;
        }
        Ok(())
    }
}

/// Two-phase parse: syntax first, shape second, so that `null` can be
/// told apart from garbage. Field names are matched case-insensitively
/// via `WifiQrCreatedMessage::from_json_value`.
fn parse_message(body: &[u8]) -> HandlerResult<WifiQrCreatedMessage> {
    let value: serde_json::Value = serde_json::from_slice(body)
        .map_err(|e| HandlerError::MalformedPayload(e.to_string()))?;

    if value.is_null() {
        return Err(HandlerError::EmptyPayload);
    }

    WifiQrCreatedMessage::from_json_value(value)
        .map_err(|e| HandlerError::MalformedPayload(e.to_string()))
}
