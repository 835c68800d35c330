pub mod client;
pub mod consumer;
pub mod processor;

pub use client::NatsClient;
pub use consumer::{BatchProcessor, NatsConsumer};
pub use processor::create_wifi_qr_processor;
