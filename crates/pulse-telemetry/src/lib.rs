//! # Pulse Telemetry
//!
//! Logging and metrics for the composition shell.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` with an `EnvFilter`, human or JSON output
//! - **Metrics**: Prometheus counters and gauges in a process-wide registry
//!
//! ## Usage
//!
//! ```rust,ignore
//! use pulse_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_telemetry(TelemetryConfig::from_env())?;
//!     // ...
//!     Ok(())
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `PULSE_LOG_LEVEL` | `info` | Log filter, falls back to `RUST_LOG` |
//! | `PULSE_JSON_LOGS` | `false` | JSON log lines (default `true` in containers) |
//! | `PULSE_CONSOLE_OUTPUT` | `true` | Write logs to stdout |
//! | `PULSE_SERVICE_NAME` | `pulse-shell` | Service name in the start-up line |

mod config;
pub mod metrics;
mod tracing_setup;

pub use config::TelemetryConfig;
pub use metrics::{
    encode_metrics, register_metrics, BUS_EVENTS_PUBLISHED, BUS_LISTENER_FAILURES,
    FRAGMENTS_MOUNTED, REMOTE_LOADS, REMOTE_LOAD_DURATION, ROUTE_MOUNTS,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize tracing subscriber: {0}")]
    TracerInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and register metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first so start-up failures are already counted
    register_metrics()?;
    tracing_setup::init_tracing(&config)?;

    Ok(TelemetryGuard {
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active. Dumps final metrics at debug level on drop.
pub struct TelemetryGuard {
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        match encode_metrics() {
            Ok(text) => tracing::debug!(metrics = %text, "Final metrics snapshot"),
            Err(e) => tracing::warn!(error = %e, "Could not encode final metrics"),
        }
        tracing::info!(service = %self.service_name, "Shutting down telemetry...");
    }
}
