mod config;
mod telemetry;

use config::ServiceConfig;
use notification_worker::{WifiQrWorker, WifiQrWorkerConfig};
use std::time::Duration;
use telemetry::init_telemetry;
use tracing::{debug, error, info};
use wifiqr_nats::NatsClient;
use wifiqr_runner::Runner;

#[tokio::main]
async fn main() {
    let config = match ServiceConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    let telemetry_guard = match init_telemetry(&config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize telemetry: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        otel_enabled = config.otel_enabled,
        nats_url = %config.nats_url,
        stream = %config.nats_stream,
        "starting wifiqr-service"
    );
    debug!("configuration: {:?}", config);

    let nats_client = match NatsClient::connect(
        &config.nats_url,
        Duration::from_secs(config.nats_connect_timeout_secs),
    )
    .await
    {
        Ok(client) => client,
        Err(e) => {
            error!("failed to connect to NATS: {:#}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = nats_client.ensure_stream(&config.nats_stream).await {
        error!("failed to ensure stream: {:#}", e);
        std::process::exit(1);
    }

    let worker = match WifiQrWorker::new(
        &nats_client,
        WifiQrWorkerConfig {
            stream: config.nats_stream.clone(),
            subject: config.nats_subject.clone(),
            durable_name: config.nats_durable_name.clone(),
            batch_size: config.nats_batch_size,
            batch_wait_secs: config.nats_batch_wait_secs,
        },
    )
    .await
    {
        Ok(worker) => worker,
        Err(e) => {
            error!("failed to initialize worker: {:#}", e);
            std::process::exit(1);
        }
    };

    let mut runner = Runner::new();
    for process in worker.into_runner_processes() {
        runner = runner.with_boxed_app_process(process);
    }

    let result = runner
        .with_closer(move || async move {
            nats_client.close().await;
            Ok(())
        })
        .with_closer_timeout(Duration::from_secs(10))
        .run()
        .await;

    if let Some(guard) = telemetry_guard {
        guard.shutdown();
    }

    if let Err(e) = result {
        error!("service exited with error: {:#}", e);
        std::process::exit(1);
    }

    info!("service exited normally");
}
