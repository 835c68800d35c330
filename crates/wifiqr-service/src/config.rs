use config::{Config, ConfigError, Environment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServiceConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// NATS server URL
    #[serde(default = "default_nats_url")]
    pub nats_url: String,

    /// NATS connect timeout in seconds
    #[serde(default = "default_nats_connect_timeout_secs")]
    pub nats_connect_timeout_secs: u64,

    /// JetStream stream holding wifi qr created events
    #[serde(default = "default_nats_stream")]
    pub nats_stream: String,

    /// Subject filter for the consumer
    #[serde(default = "default_nats_subject")]
    pub nats_subject: String,

    /// Durable consumer name
    #[serde(default = "default_nats_durable_name")]
    pub nats_durable_name: String,

    /// Batch size for the consumer
    #[serde(default = "default_nats_batch_size")]
    pub nats_batch_size: usize,

    /// Max wait time for batches in seconds
    #[serde(default = "default_nats_batch_wait_secs")]
    pub nats_batch_wait_secs: u64,

    /// OTLP endpoint for traces and logs
    #[serde(default = "default_otel_endpoint")]
    pub otel_endpoint: String,

    /// Whether to export telemetry via OTLP
    #[serde(default)]
    pub otel_enabled: bool,

    /// Service name reported to the telemetry backend
    #[serde(default = "default_otel_service_name")]
    pub otel_service_name: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_nats_url() -> String {
    "nats://localhost:4222".to_string()
}

fn default_nats_connect_timeout_secs() -> u64 {
    10
}

fn default_nats_stream() -> String {
    "wifi_qr_created".to_string()
}

fn default_nats_subject() -> String {
    "wifi_qr_created.>".to_string()
}

fn default_nats_durable_name() -> String {
    "wifiqr-notification-worker".to_string()
}

fn default_nats_batch_size() -> usize {
    30
}

fn default_nats_batch_wait_secs() -> u64 {
    5
}

fn default_otel_endpoint() -> String {
    "http://localhost:4317".to_string()
}

fn default_otel_service_name() -> String {
    "wifiqr-service".to_string()
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(Environment::with_prefix("WIFIQR"))
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Env var tests must not interleave
    static TEST_LOCK: Mutex<()> = Mutex::new(());

    #[test]
    fn test_default_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::remove_var("WIFIQR_LOG_LEVEL");
        std::env::remove_var("WIFIQR_NATS_URL");
        std::env::remove_var("WIFIQR_NATS_BATCH_SIZE");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "info");
        assert_eq!(config.nats_url, "nats://localhost:4222");
        assert_eq!(config.nats_stream, "wifi_qr_created");
        assert_eq!(config.nats_subject, "wifi_qr_created.>");
        assert_eq!(config.nats_durable_name, "wifiqr-notification-worker");
        assert_eq!(config.nats_batch_size, 30);
        assert_eq!(config.nats_batch_wait_secs, 5);
        assert!(!config.otel_enabled);
    }

    #[test]
    fn test_custom_config() {
        let _lock = TEST_LOCK.lock().unwrap();

        std::env::set_var("WIFIQR_LOG_LEVEL", "debug");
        std::env::set_var("WIFIQR_NATS_URL", "nats://nats.internal:4222");
        std::env::set_var("WIFIQR_NATS_BATCH_SIZE", "100");

        let config = ServiceConfig::from_env().unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.nats_url, "nats://nats.internal:4222");
        assert_eq!(config.nats_batch_size, 100);

        std::env::remove_var("WIFIQR_LOG_LEVEL");
        std::env::remove_var("WIFIQR_NATS_URL");
        std::env::remove_var("WIFIQR_NATS_BATCH_SIZE");
    }
}
