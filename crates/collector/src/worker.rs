//! Line-handler worker pool
//!
//! A fixed set of workers drains the payload queue: each worker tab-splits
//! a payload and runs every metric of the active preset over it, in
//! declaration order. Per-metric failures on one line are aggregated into
//! a single [`LineError`], counted once and logged at debug level with the
//! offending line; the next line is unaffected.
//!
//! Shutdown is channel closure: when the listener drops its sender the
//! workers drain what is left and return.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crossfire::MAsyncRx;
use httplog_metric::{split_fields, ParseError, ParseScratch, Preset};
use prometheus::{Gauge, IntCounter};
use tokio::task::JoinHandle;

/// State shared by every worker in the pool
#[derive(Debug)]
pub(crate) struct WorkerShared {
    /// The active preset
    pub preset: Arc<Preset>,

    /// Lines that failed at least one metric
    pub parse_errors: IntCounter,

    /// Unix timestamp of the most recent payload
    pub last_received: Gauge,
}

/// All per-metric failures for one line
#[derive(Debug)]
pub struct LineError {
    /// `(metric name, failure)` per failed metric, in declaration order
    pub failures: Vec<(String, ParseError)>,
}

impl std::fmt::Display for LineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (index, (name, error)) in self.failures.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }

            write!(f, "metric {}: {}", name, error)?;
        }

        Ok(())
    }
}

impl std::error::Error for LineError {}

/// Run every metric of the preset over one decoded line
///
/// All metrics are attempted even when earlier ones fail; a parse error
/// in one metric must not shadow updates or errors of the others.
pub fn parse_line(
    preset: &Preset,
    fields: &[&str],
    scratch: &mut ParseScratch,
) -> Result<(), LineError> {
    let mut failures = Vec::new();

    for metric in preset.metrics() {
        if let Err(error) = metric.parse(fields, scratch) {
            failures.push((metric.name().to_string(), error));
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(LineError { failures })
    }
}

/// Fixed-size pool of line-handler workers
#[derive(Debug)]
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `worker_count` workers (0 means one per CPU)
    pub(crate) fn start(
        worker_count: usize,
        payload_rx: MAsyncRx<String>,
        shared: Arc<WorkerShared>,
    ) -> Self {
        let worker_count = if worker_count == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4)
        } else {
            worker_count
        };

        let mut handles = Vec::with_capacity(worker_count);

        for worker_id in 0..worker_count {
            let payload_rx = payload_rx.clone();
            let shared = Arc::clone(&shared);

            handles.push(tokio::spawn(async move {
                worker_loop(worker_id, payload_rx, shared).await;
            }));
        }

        tracing::info!(workers = worker_count, "line handlers started");

        Self { handles }
    }

    /// Number of spawned workers
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Wait for every worker to drain and return
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(worker_id: usize, payload_rx: MAsyncRx<String>, shared: Arc<WorkerShared>) {
    tracing::debug!(worker_id, "line handler started");

    let mut scratch = ParseScratch::new();

    // recv errors only once the channel is closed and drained.
    while let Ok(payload) = payload_rx.recv().await {
        shared.last_received.set(unix_now_seconds());

        let fields = split_fields(&payload);

        if let Err(error) = parse_line(&shared.preset, &fields, &mut scratch) {
            shared.parse_errors.inc();
            tracing::debug!(
                error = %error,
                line = %payload,
                "error parsing line"
            );
        }
    }

    tracing::debug!(worker_id, "line handler stopped");
}

/// Current wall-clock time as fractional unix seconds
fn unix_now_seconds() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_secs_f64())
        .unwrap_or(0.0)
}

#[cfg(test)]
#[path = "worker_test.rs"]
mod worker_test;
