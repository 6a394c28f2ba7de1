//! Prometheus metrics for the composition shell.
//!
//! All metrics follow the naming convention: `pulse_<component>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., remote_loads_total)
//! - **Gauge**: Value that can go up or down (e.g., fragments_mounted)
//! - **Histogram**: Distribution of values (e.g., remote_load_duration_seconds)

use lazy_static::lazy_static;
use prometheus::{
    CounterVec, Encoder, Gauge, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // EVENT BUS
    // =========================================================================

    /// Events published, per topic
    pub static ref BUS_EVENTS_PUBLISHED: CounterVec = CounterVec::new(
        Opts::new("pulse_bus_events_published_total", "Total events published on the bus"),
        &["topic"]
    ).expect("metric creation failed");

    /// Listener failures isolated during dispatch, per topic
    pub static ref BUS_LISTENER_FAILURES: CounterVec = CounterVec::new(
        Opts::new("pulse_bus_listener_failures_total", "Total listener failures during dispatch"),
        &["topic"]
    ).expect("metric creation failed");

    // =========================================================================
    // REMOTE REGISTRY
    // =========================================================================

    /// Remote fetches
    pub static ref REMOTE_LOADS: CounterVec = CounterVec::new(
        Opts::new("pulse_remote_loads_total", "Total remote entry fetches"),
        &["remote", "outcome"]  // outcome: ready/failed
    ).expect("metric creation failed");

    /// Remote fetch duration
    pub static ref REMOTE_LOAD_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "pulse_remote_load_duration_seconds",
            "Time spent fetching a remote entry"
        ).buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["remote"]
    ).expect("metric creation failed");

    // =========================================================================
    // COMPOSITION HOST
    // =========================================================================

    /// Route mount attempts
    pub static ref ROUTE_MOUNTS: CounterVec = CounterVec::new(
        Opts::new("pulse_route_mounts_total", "Total route mount attempts"),
        &["route", "outcome"]  // outcome: mounted/unknown_remote/remote_load/mount
    ).expect("metric creation failed");

    /// Fragments currently mounted
    pub static ref FRAGMENTS_MOUNTED: Gauge = Gauge::new(
        "pulse_fragments_mounted",
        "Number of fragments currently mounted"
    ).expect("metric creation failed");
}

/// Register every metric with the global registry.
///
/// Safe to call more than once; already registered metrics are skipped.
pub fn register_metrics() -> Result<(), TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(BUS_EVENTS_PUBLISHED.clone()),
        Box::new(BUS_LISTENER_FAILURES.clone()),
        Box::new(REMOTE_LOADS.clone()),
        Box::new(REMOTE_LOAD_DURATION.clone()),
        Box::new(ROUTE_MOUNTS.clone()),
        Box::new(FRAGMENTS_MOUNTED.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(())
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
