//! # Adapters
//!
//! Port implementations the shell plugs into the library crates. They are
//! where metrics get recorded, so the libraries stay metrics-agnostic.

pub mod telemetry;

pub use telemetry::{tap_bus_metrics, InstrumentedFetcher, MetricsObserver, TelemetryReporter};
