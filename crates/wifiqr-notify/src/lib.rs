pub mod analytics;
pub mod audit;
pub mod email;

pub use analytics::AnalyticsUpdate;
pub use audit::AuditTrail;
pub use email::EmailNotification;
