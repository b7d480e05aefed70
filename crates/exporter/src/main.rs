//! httplog-exporter - access logs in, Prometheus metrics out
//!
//! Ingests tab-delimited web-server access logs over the syslog wire
//! protocol (UDP or unix datagram) and exposes the aggregated counters,
//! gauges and histograms on an HTTP scrape endpoint.
//!
//! # Usage
//!
//! ```bash
//! # Run with the default config path
//! httplog-exporter
//!
//! # Run with an explicit config
//! httplog-exporter --config configs/example.toml
//!
//! # Check a config without starting anything
//! httplog-exporter --config configs/example.toml --verify-config
//! ```

mod server;

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use httplog_collector::Collector;
use httplog_config::{Config, LogFormat};
use prometheus::Registry;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// How long shutdown may take before the scrape endpoint is aborted
const SHUTDOWN_DEADLINE: Duration = Duration::from_secs(10);

/// Prometheus exporter for web-server access logs
#[derive(Parser, Debug)]
#[command(name = "httplog-exporter")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "configs/config.toml")]
    config: PathBuf,

    /// Log level override (trace, debug, info, warn, error)
    #[arg(short, long)]
    log_level: Option<String>,

    /// Validate the configuration and exit
    #[arg(long)]
    verify_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::from_file(&cli.config)
        .with_context(|| format!("loading configuration from {}", cli.config.display()))?;

    if cli.verify_config {
        println!("configuration OK: {}", cli.config.display());
        return Ok(());
    }

    let level = cli
        .log_level
        .unwrap_or_else(|| config.log.level.as_str().to_string());
    init_logging(&level, config.log.format)?;

    run(config).await
}

async fn run(config: Config) -> Result<()> {
    let collector = Collector::new(&config).await?;

    let registry = Registry::new();
    registry
        .register(Box::new(collector.metrics_handle()))
        .context("registering collector")?;

    let shutdown = CancellationToken::new();

    // A terminal listener error winds the whole process down.
    {
        let shutdown = shutdown.clone();
        let terminated = collector.terminated();
        tokio::spawn(async move {
            terminated.cancelled().await;
            shutdown.cancel();
        });
    }

    // So do the usual signals.
    {
        let shutdown = shutdown.clone();
        tokio::spawn(async move {
            wait_for_signal().await;
            tracing::info!("shutdown signal received");
            shutdown.cancel();
        });
    }

    let server = tokio::spawn(server::serve(
        config.web.listen_address.clone(),
        registry,
        shutdown.clone(),
    ));

    shutdown.cancelled().await;

    // Socket first, then the queue: workers drain in-flight payloads.
    collector.close().await;

    // Let an in-progress scrape finish, but not forever.
    match tokio::time::timeout(SHUTDOWN_DEADLINE, server).await {
        Ok(result) => result.context("scrape endpoint task")??,
        Err(_) => tracing::warn!(
            deadline_seconds = SHUTDOWN_DEADLINE.as_secs(),
            "scrape endpoint did not stop in time"
        ),
    }

    tracing::info!("shutdown complete");

    Ok(())
}

/// Initialize the tracing subscriber for logging
fn init_logging(level: &str, format: LogFormat) -> Result<()> {
    let filter = EnvFilter::try_new(level)
        .or_else(|_| EnvFilter::try_new("info"))
        .map_err(|e| anyhow::anyhow!("invalid log level: {}", e))?;

    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Console => registry
            .with(fmt::layer().with_target(true).with_thread_ids(false))
            .init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }

    Ok(())
}

/// Wait for SIGINT or SIGTERM
async fn wait_for_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                tracing::warn!(error = %error, "could not install SIGTERM handler");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
