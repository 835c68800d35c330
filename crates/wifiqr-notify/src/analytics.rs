use async_trait::async_trait;
use tracing::info;
use wifiqr_domain::{NotificationStep, WifiQrCreatedMessage};

/// Analytics update step.
///
/// Placeholder: a real implementation would record a metric or write
/// an analytics row to an external store.
#[derive(Debug, Default)]
pub struct AnalyticsUpdate;

impl AnalyticsUpdate {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationStep for AnalyticsUpdate {
    fn name(&self) -> &'static str {
        "analytics"
    }

    async fn perform(&self, message: &WifiQrCreatedMessage) -> anyhow::Result<()> {
        info!(
            wifi_id = %message.wifi_id,
            hidden = message.hidden,
            "updating analytics for wifi qr creation"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::sample_message;

    #[tokio::test]
    async fn test_analytics_step_succeeds() {
        let step = AnalyticsUpdate::new();
        assert_eq!(step.name(), "analytics");
        assert!(step.perform(&sample_message()).await.is_ok());
    }
}
