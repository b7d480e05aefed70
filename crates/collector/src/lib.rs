//! httplog - Collector
//!
//! Wires the syslog listener, the bounded payload queue, the worker pool
//! and the metric engine into one scrape-ready unit.
//!
//! # Architecture
//!
//! ```text
//! SyslogListener ──▶ bounded queue ──▶ WorkerPool ──▶ Preset metrics
//!       │                                                  │
//!       └── CancellationToken                              ▼
//!                                     MetricsHandle (describe / collect)
//!                                        + log_parse_errors_total
//!                                        + log_last_received_timestamp_seconds
//! ```
//!
//! # Shutdown ordering
//!
//! `close()` cancels the listener first (the socket stops reading), which
//! drops the queue's only sender; the workers drain whatever is still
//! queued and return; then `close()` returns. In-flight packets are
//! accounted for, and nothing publishes after close completes.

mod error;
mod worker;

pub use error::CollectorError;
pub use worker::{parse_line, LineError, WorkerPool};

use std::net::SocketAddr;
use std::sync::Arc;

use httplog_config::Config;
use httplog_metric::Preset;
use httplog_syslog::SyslogListener;
use prometheus::core::{Collector as PrometheusCollector, Desc};
use prometheus::proto::MetricFamily;
use prometheus::{Gauge, IntCounter};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use worker::WorkerShared;

/// The assembled ingestion pipeline
///
/// Owns the listener task, the worker pool and all aggregates. Expose the
/// samples to a registry via [`metrics_handle`](Self::metrics_handle);
/// shut down with [`close`](Self::close).
#[derive(Debug)]
pub struct Collector {
    shared: Arc<WorkerShared>,
    cancel: CancellationToken,
    terminated: CancellationToken,
    listener_task: JoinHandle<()>,
    pool: WorkerPool,
    syslog_addr: Option<SocketAddr>,
}

/// Cloneable describe/collect façade over the collector's aggregates
///
/// Remains valid while the collector runs; register it with a
/// `prometheus::Registry` to serve scrapes.
#[derive(Clone)]
pub struct MetricsHandle {
    shared: Arc<WorkerShared>,
}

impl PrometheusCollector for MetricsHandle {
    fn desc(&self) -> Vec<&Desc> {
        let mut descs = self.shared.parse_errors.desc();
        descs.extend(self.shared.last_received.desc());

        for metric in self.shared.preset.metrics() {
            descs.extend(metric.desc());
        }

        descs
    }

    fn collect(&self) -> Vec<MetricFamily> {
        let mut families = self.shared.parse_errors.collect();
        families.extend(self.shared.last_received.collect());

        for metric in self.shared.preset.metrics() {
            families.extend(metric.collect());
        }

        families
    }
}

impl Collector {
    /// Compile the active preset, bind the listener and start the workers
    ///
    /// # Errors
    ///
    /// Fails when the active preset is missing or invalid, or when the
    /// syslog socket cannot be bound. Construction failures are fatal;
    /// nothing keeps running behind them.
    pub async fn new(config: &Config) -> Result<Self, CollectorError> {
        let preset_config = config.active_preset()?;
        let preset = Arc::new(Preset::compile(&config.global.preset, preset_config)?);

        tracing::info!(
            preset = %preset.name(),
            metrics = preset.len(),
            "preset compiled"
        );

        let parse_errors = IntCounter::new(
            "log_parse_errors_total",
            "Total number of log lines that failed to parse",
        )?;

        let last_received = Gauge::new(
            "log_last_received_timestamp_seconds",
            "Unix timestamp of the most recently received log line",
        )?;

        let (payload_tx, payload_rx) =
            crossfire::mpmc::bounded_async(config.global.effective_buffer_size());

        let listener = SyslogListener::bind(&config.syslog.listen_address, payload_tx).await?;
        let syslog_addr = listener.local_addr();

        tracing::info!(
            address = %config.syslog.listen_address,
            buffer_size = config.global.effective_buffer_size(),
            "syslog listener bound"
        );

        let cancel = CancellationToken::new();
        let terminated = CancellationToken::new();

        let listener_task = {
            let cancel = cancel.clone();
            let terminated = terminated.clone();

            tokio::spawn(async move {
                if let Err(error) = listener.run(cancel).await {
                    tracing::error!(error = %error, "syslog listener failed");
                }

                // Either a terminal socket error or a cancellation: the
                // sender is gone and the pipeline is winding down.
                terminated.cancel();
            })
        };

        let shared = Arc::new(WorkerShared {
            preset,
            parse_errors,
            last_received,
        });

        let pool = WorkerPool::start(
            config.global.effective_worker_count(),
            payload_rx,
            Arc::clone(&shared),
        );

        Ok(Self {
            shared,
            cancel,
            terminated,
            listener_task,
            pool,
            syslog_addr,
        })
    }

    /// A cloneable handle implementing the scrape contract
    pub fn metrics_handle(&self) -> MetricsHandle {
        MetricsHandle {
            shared: Arc::clone(&self.shared),
        }
    }

    /// Local address of the UDP syslog socket (None for unix sockets)
    ///
    /// Useful when configured with port 0.
    pub fn syslog_addr(&self) -> Option<SocketAddr> {
        self.syslog_addr
    }

    /// Cancelled when the listener has stopped for any reason
    ///
    /// Hosts select on this next to their own signals so that a terminal
    /// socket error initiates coordinated shutdown.
    pub fn terminated(&self) -> CancellationToken {
        self.terminated.clone()
    }

    /// Number of running workers
    pub fn worker_count(&self) -> usize {
        self.pool.worker_count()
    }

    /// Stop the listener, drain the workers, and return
    ///
    /// Socket first, queue second: pending payloads are still processed,
    /// and no sample is published after `close` returns.
    pub async fn close(self) {
        self.cancel.cancel();
        let _ = self.listener_task.await;
        self.pool.join().await;

        tracing::info!("collector closed");
    }
}
