use async_trait::async_trait;
use tracing::info;
use wifiqr_domain::{NotificationStep, WifiQrCreatedMessage};

/// Audit trail step. Emits a human-readable audit line with the actor
/// and creation timestamp; persistence of the trail lives elsewhere.
#[derive(Debug, Default)]
pub struct AuditTrail;

impl AuditTrail {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationStep for AuditTrail {
    fn name(&self) -> &'static str {
        "audit"
    }

    async fn perform(&self, message: &WifiQrCreatedMessage) -> anyhow::Result<()> {
        info!(
            wifi_id = %message.wifi_id,
            "audit: wifi qr code created by {} at {}",
            message.created_by,
            message.created_at
        );
        Ok(())
    }
}
