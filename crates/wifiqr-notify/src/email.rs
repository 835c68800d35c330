use async_trait::async_trait;
use tracing::info;
use wifiqr_domain::{NotificationStep, WifiQrCreatedMessage};

/// Email notification step.
///
/// Placeholder: a real implementation would dispatch through an
/// external email provider. Provider failures are returned as-is; the
/// handler service attributes them and the record is redelivered.
#[derive(Debug, Default)]
pub struct EmailNotification;

impl EmailNotification {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationStep for EmailNotification {
    fn name(&self) -> &'static str {
        "email"
    }

    async fn perform(&self, message: &WifiQrCreatedMessage) -> anyhow::Result<()> {
        // TODO: wire up the email provider client
        info!(
            wifi_id = %message.wifi_id,
            ssid = %message.ssid,
            "sending email notification for wifi network"
        );
        Ok(())
    }
}
