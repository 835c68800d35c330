pub mod error;
pub mod message;
pub mod notification;
pub mod outcome;
pub mod service;

pub use error::{HandlerError, HandlerResult};
pub use message::{QueueRecord, WifiQrCreatedMessage};
pub use notification::NotificationStep;
pub use outcome::RecordOutcome;
pub use service::WifiQrCreatedService;
