use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;
use wifiqr_domain::WifiQrCreatedService;
use wifiqr_nats::{create_wifi_qr_processor, NatsClient, NatsConsumer};
use wifiqr_notify::{AnalyticsUpdate, AuditTrail, EmailNotification};

pub struct WifiQrWorkerConfig {
    pub stream: String,
    pub subject: String,
    pub durable_name: String,
    pub batch_size: usize,
    pub batch_wait_secs: u64,
}

/// Consumes WiFi QR created events and dispatches the notification
/// steps through the domain service.
pub struct WifiQrWorker {
    consumer: NatsConsumer,
}

impl WifiQrWorker {
    pub async fn new(nats_client: &NatsClient, config: WifiQrWorkerConfig) -> anyhow::Result<Self> {
        info!("initializing WiFi QR notification worker");

        let service = Arc::new(WifiQrCreatedService::new(
            Arc::new(EmailNotification::new()),
            Arc::new(AnalyticsUpdate::new()),
            Arc::new(AuditTrail::new()),
        ));

        let processor = create_wifi_qr_processor(service);
        let consumer = NatsConsumer::new(
            nats_client.jetstream(),
            &config.stream,
            &config.durable_name,
            &config.subject,
            config.batch_size,
            config.batch_wait_secs,
            processor,
        )
        .await?;

        info!("WiFi QR notification worker initialized");

        Ok(Self { consumer })
    }

    pub fn into_runner_processes(
        self,
    ) -> Vec<
        Box<
            dyn FnOnce(
                    CancellationToken,
                ) -> std::pin::Pin<
                    Box<dyn std::future::Future<Output = anyhow::Result<()>> + Send>,
                > + Send,
        >,
    > {
        vec![Box::new({
            let consumer = self.consumer;
            move |ctx| Box::pin(async move { consumer.run(ctx).await })
        })]
    }
}
