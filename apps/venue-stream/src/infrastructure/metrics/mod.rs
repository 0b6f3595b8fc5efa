//! Prometheus Metrics Module
//!
//! Exposes service metrics in Prometheus format.
//!
//! # Metrics Categories
//!
//! - **Triggers**: inbound requests by outcome
//! - **Pipelines**: runs by outcome, currently active runs
//! - **Emission**: businesses pushed into streams
//! - **Latency**: search provider round trip
//!
//! # Integration
//!
//! Metrics are exposed at `/metrics` on the HTTP listener.

use std::sync::OnceLock;
use std::time::Duration;

use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

// =============================================================================
// Global Metrics Handle
// =============================================================================

static PROMETHEUS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Initialize the Prometheus metrics recorder.
///
/// # Panics
///
/// Panics if the recorder cannot be installed.
#[allow(clippy::expect_used)]
pub fn init_metrics() -> PrometheusHandle {
    PROMETHEUS_HANDLE
        .get_or_init(|| {
            let builder = PrometheusBuilder::new();
            let handle = builder
                .install_recorder()
                .expect("failed to install Prometheus recorder");

            register_metrics();
            handle
        })
        .clone()
}

/// Get the Prometheus handle for rendering metrics.
///
/// Returns `None` if metrics have not been initialized.
#[must_use]
pub fn get_metrics_handle() -> Option<PrometheusHandle> {
    PROMETHEUS_HANDLE.get().cloned()
}

// =============================================================================
// Metric Registration
// =============================================================================

fn register_metrics() {
    describe_counter!(
        "venue_stream_triggers_total",
        "Inbound trigger requests by outcome"
    );
    describe_counter!(
        "venue_stream_pipelines_total",
        "Finished pipelines by outcome"
    );
    describe_gauge!(
        "venue_stream_pipelines_active",
        "Pipelines currently running"
    );
    describe_counter!(
        "venue_stream_businesses_emitted_total",
        "Businesses emitted into request streams"
    );
    describe_histogram!(
        "venue_stream_fetch_duration_seconds",
        "Search provider round trip time"
    );
}

// =============================================================================
// Metric Recording Functions
// =============================================================================

/// Outcome label for inbound triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// Valid request, pipeline started.
    Accepted,
    /// Missing or invalid parameters.
    BadRequest,
    /// Unsupported method.
    NotFound,
}

impl TriggerOutcome {
    const fn as_str(self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::BadRequest => "bad_request",
            Self::NotFound => "not_found",
        }
    }
}

/// Record an inbound trigger.
pub fn record_trigger(outcome: TriggerOutcome) {
    counter!("venue_stream_triggers_total", "outcome" => outcome.as_str()).increment(1);
}

/// Record a finished pipeline.
pub fn record_pipeline_finished(outcome: &'static str) {
    counter!("venue_stream_pipelines_total", "outcome" => outcome).increment(1);
}

/// Update the active pipeline gauge.
#[allow(clippy::cast_precision_loss)]
pub fn set_active_pipelines(count: usize) {
    gauge!("venue_stream_pipelines_active").set(count as f64);
}

/// Record businesses emitted by one pipeline.
pub fn record_businesses_emitted(count: u64) {
    counter!("venue_stream_businesses_emitted_total").increment(count);
}

/// Record search provider latency.
pub fn record_fetch_duration(duration: Duration) {
    histogram!("venue_stream_fetch_duration_seconds").record(duration.as_secs_f64());
}

// =============================================================================
// Tests
// =============================================================================
