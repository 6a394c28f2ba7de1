//! # Shell Container
//!
//! Builds the shared infrastructure once at start-up and hands out
//! references. Nothing here is a global: the bus and the state store are
//! created per container and injected into the host and, through it, into
//! every mounted fragment.
//!
//! ## Wiring Order
//!
//! 1. Event bus (with the metrics-recording error reporter)
//! 2. Application state store (publishes on the bus)
//! 3. Fetcher for the configured mode, wrapped for metrics
//! 4. Remote registry over the configured descriptors
//! 5. Composition host over the route table

pub mod config;

pub use config::{ConfigError, FetchMode, ShellConfig};

use pf_01_remote_registry::{
    BundledFetcher, HttpManifestFetcher, ModuleFetcher, RemoteModuleRegistry,
};
use pf_02_composition_host::{AppStore, CompositionHost};
use shared_bus::{EventBus, Subscription};
use shared_types::{AppState, FetchError};
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

use crate::adapters::{tap_bus_metrics, InstrumentedFetcher, MetricsObserver, TelemetryReporter};
use crate::fragments;

/// Errors raised while assembling the shell.
#[derive(Debug, Error)]
pub enum ContainerError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cannot build remote fetcher: {0}")]
    Fetcher(#[from] FetchError),
}

/// All long-lived shell components.
pub struct ShellContainer {
    pub config: ShellConfig,
    pub bus: Arc<EventBus>,
    pub store: Arc<AppStore>,
    pub registry: Arc<RemoteModuleRegistry>,
    pub host: Arc<CompositionHost>,
    /// Per-topic publish counters; released at shutdown.
    pub metrics_taps: Vec<Subscription>,
}

impl ShellContainer {
    /// Wire every component from a validated configuration.
    pub fn new(config: ShellConfig) -> Result<Self, ContainerError> {
        let fetcher: Arc<dyn ModuleFetcher> = match config.shell.fetch_mode {
            FetchMode::Bundled => Arc::new(BundledFetcher::new(fragments::catalog())),
            FetchMode::Http => Arc::new(HttpManifestFetcher::new(
                fragments::catalog(),
                config.fetch_timeout(),
            )?),
        };

        Self::with_fetcher(config, fetcher)
    }

    /// Wire every component around a caller-supplied fetcher.
    pub fn with_fetcher(
        config: ShellConfig,
        fetcher: Arc<dyn ModuleFetcher>,
    ) -> Result<Self, ContainerError> {
        config.validate()?;

        let bus = Arc::new(EventBus::with_reporter(Arc::new(TelemetryReporter::default())));
        let metrics_taps = tap_bus_metrics(&bus);

        let store = Arc::new(AppStore::new(
            AppState::for_user(config.user_profile()),
            bus.clone(),
        ));

        let registry = Arc::new(RemoteModuleRegistry::new(
            config.descriptors(),
            Arc::new(InstrumentedFetcher::new(fetcher)),
        ));

        let host = Arc::new(
            CompositionHost::new(
                config.route_table()?,
                registry.clone(),
                bus.clone(),
                store.clone(),
            )
            .with_config(config.host_config())
            .with_observer(Arc::new(MetricsObserver)),
        );

        info!(
            remotes = config.remotes.len(),
            routes = config.routes.len(),
            fetch_mode = ?config.shell.fetch_mode,
            "Shell container wired"
        );

        Ok(Self {
            config,
            bus,
            store,
            registry,
            host,
            metrics_taps,
        })
    }
}
