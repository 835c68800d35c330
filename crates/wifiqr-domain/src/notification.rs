use crate::message::WifiQrCreatedMessage;
use async_trait::async_trait;

/// A single side-effecting notification capability.
///
/// Implementations live in the infrastructure layer (wifiqr-notify)
/// and are interchangeable behind this trait so the handler's
/// orchestration can be tested with mocks. Implementations report
/// plain infrastructure errors; the service attributes them to the
/// step via `name` when it wraps them into the handler taxonomy.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationStep: Send + Sync {
    /// Short stable name used in logs and error context.
    fn name(&self) -> &'static str;

    /// Perform the side effect for one message.
    async fn perform(&self, message: &WifiQrCreatedMessage) -> anyhow::Result<()>;
}
