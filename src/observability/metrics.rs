//! Metrics collection and exposition.
//!
//! # Responsibilities
//! - Define upload metrics (count, latency, size)
//! - Expose Prometheus-compatible metrics endpoint
//!
//! # Metrics
//! - `uploads_total` (counter): uploads by transform and response status
//! - `upload_duration_seconds` (histogram): handler latency by transform
//! - `upload_size_bytes` (histogram): accepted upload sizes by transform
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests, disabled config)
//! - The recorder is process-wide and installed at most once

use std::net::SocketAddr;
use std::sync::Mutex;
use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};

static INSTALLED: Mutex<bool> = Mutex::new(false);

/// Install the Prometheus recorder and its HTTP listener.
///
/// Once a call has succeeded, later calls are no-ops. A failed install (for
/// example, the listener address is taken) leaves nothing installed.
/// Must run inside a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    let mut installed = INSTALLED.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    if *installed {
        return Ok(());
    }

    PrometheusBuilder::new().with_http_listener(addr).install()?;
    *installed = true;
    tracing::info!(address = %addr, "Metrics endpoint listening");
    Ok(())
}

/// Record one finished upload request.
pub fn record_upload(transform: &'static str, status: u16, started: Instant) {
    metrics::counter!("uploads_total", "transform" => transform, "status" => status.to_string())
        .increment(1);
    metrics::histogram!("upload_duration_seconds", "transform" => transform)
        .record(started.elapsed().as_secs_f64());
}

/// Record the size of an accepted upload.
pub fn record_upload_size(transform: &'static str, bytes: u64) {
    metrics::histogram!("upload_size_bytes", "transform" => transform).record(bytes as f64);
}
