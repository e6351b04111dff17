//! # Meso CWOP
//!
//! Upload weather-station observations to CWOP over APRS-IS.
//!
//! This application periodically reads the newest row of a data-logger
//! table and sends it to the CWOP ingestion server as an APRS weather report.

use anyhow::{Context, Result};
use meso_cwop::aprs::protocol::AprsReport;
use meso_cwop::config::{Config, LoggingConfig};
use meso_cwop::cycle::run_cycle;
use meso_cwop::error::CwopError;
use meso_cwop::scheduler::Scheduler;
use meso_cwop::uploader::CwopUploader;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// Environment variable naming the configuration file
const CONFIG_PATH_ENV: &str = "MESO_CWOP_CONFIG";

/// Configuration file used when the environment variable is unset
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// File name prefix for rolling log files
const LOG_FILE_PREFIX: &str = "meso-cwop.log";

/// Main entry point for Meso CWOP
///
/// Loads the configuration, then runs one read-encode-upload cycle per
/// configured interval until Ctrl+C.
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration from `$MESO_CWOP_CONFIG` (or `config/default.toml`)
///    - Set up logging with tracing subscriber
///
/// 2. **Main Loop**
///    - Read the last data-logger row, encode, upload
///    - Log the outcome; failures wait for the next tick
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C stops the loop between cycles
///
/// # Examples
///
/// ```bash
/// MESO_CWOP_CONFIG=/etc/meso-cwop.toml cargo run --release
/// ```
///
/// Expected output:
/// ```text
/// INFO meso_cwop: Meso CWOP v0.1.0 starting...
/// INFO meso_cwop: Station FW1234 reporting every 300s to cwop.aprs.net:14580
/// INFO meso_cwop::cycle: Encoded report: FW1234>APRS,TCPIP*:@151432z...
/// INFO upload{...}: meso_cwop::uploader: Uploaded report (80 bytes)
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config_path =
        std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    // Keep the guard alive so buffered log lines are flushed on exit
    let _log_guard = init_logging(&config.logging);

    info!("Meso CWOP v{} starting...", env!("CARGO_PKG_VERSION"));

    let uploader = CwopUploader::new(config.server.clone());
    let scheduler = Scheduler::new(Duration::from_secs(config.schedule.interval_s));

    info!(
        "Station {} reporting every {}s to {}:{}",
        config.station.id,
        scheduler.period().as_secs(),
        config.server.host,
        config.server.port
    );
    info!("Press Ctrl+C to exit");

    let config = &config;
    let uploader = &uploader;

    let cycles = scheduler
        .run(
            move || async move { log_cycle_result(run_cycle(config, uploader).await) },
            async {
                if let Err(e) = tokio::signal::ctrl_c().await {
                    error!("Failed to listen for Ctrl+C: {}", e);
                    std::future::pending::<()>().await;
                }
                info!("Received Ctrl+C, shutting down...");
            },
        )
        .await;

    info!("Total cycles run: {}", cycles);
    Ok(())
}

/// Install the tracing subscriber
///
/// Logs to stdout, or to a daily rolling file when `log_dir` is set.
fn init_logging(logging: &LoggingConfig) -> Option<WorkerGuard> {
    let level = logging
        .level
        .parse::<tracing::Level>()
        .unwrap_or(tracing::Level::INFO);
    let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

    if logging.log_dir.is_empty() {
        tracing_subscriber::fmt().with_env_filter(filter).init();
        return None;
    }

    let appender = tracing_appender::rolling::daily(&logging.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Some(guard)
}

/// Report how a cycle ended; errors never stop the scheduler
fn log_cycle_result(result: meso_cwop::error::Result<AprsReport>) {
    match result {
        Ok(report) => info!("Cycle complete: sent {}", report),
        Err(e) if e.is_transport() => warn!("Upload failed, next cycle sends fresh data: {}", e),
        Err(CwopError::InvalidRecord(msg)) => warn!("Skipping invalid observation: {}", msg),
        Err(e) => error!("Cycle aborted: {}", e),
    }
}
