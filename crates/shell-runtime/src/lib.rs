//! # Pulse Shell Runtime
//!
//! The host application of the FitLog micro-frontends.
//!
//! ## Modular Structure
//!
//! - `container/` - configuration and dependency wiring
//! - `adapters/` - metrics-recording port implementations
//! - `fragments/` - the bundled workout, food and analytics fragments
//!
//! ## Composition Flow
//!
//! ```text
//! navigate("/workout/new/Squats/3/10")
//!        │
//!        ↓
//! CompositionHost ──resolve("workout")──→ RemoteModuleRegistry ──fetch──→ Fetcher
//!        │                                        (cached after first load)
//!        ↓
//! WorkoutModule.mount(context) ──publish──→ EventBus ──workout:logged──→ Analytics
//! ```
//!
//! ## Startup Sequence
//!
//! 1. Load configuration (file, `PULSE_CONFIG`, or built-in defaults)
//! 2. Wire bus, state store, registry and host
//! 3. Preload configured remotes (failures are logged, not fatal)
//! 4. Navigate to `/`

pub mod adapters;
pub mod container;
pub mod fragments;

use pf_01_remote_registry::RemoteRegistryApi;
use pf_02_composition_host::{CompositionApi, RouteView};
use shared_bus::Subscription;
use shared_types::{AppState, FragmentName, StateAccess, StateAction, StateChange};
use std::sync::Arc;
use tracing::{info, warn};

pub use container::{ConfigError, ContainerError, FetchMode, ShellConfig, ShellContainer};

/// The running shell.
pub struct ShellRuntime {
    container: ShellContainer,
}

impl ShellRuntime {
    pub fn new(config: ShellConfig) -> Result<Self, ContainerError> {
        info!("Creating Pulse shell runtime");
        Ok(Self {
            container: ShellContainer::new(config)?,
        })
    }

    /// Wrap an already wired container.
    pub fn from_container(container: ShellContainer) -> Self {
        Self { container }
    }

    /// Preload configured remotes and show the home view.
    pub async fn start(&self) -> RouteView {
        info!("===========================================");
        info!("  Pulse Shell v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");

        for name in &self.container.config.shell.preload {
            let name = FragmentName::from(name.as_str());
            match self.container.registry.preload(&name).await {
                Ok(()) => info!(remote = %name, "Remote preloaded"),
                // The route shows its own error placeholder later; start-up goes on.
                Err(e) => warn!(remote = %name, error = %e, "Preload failed"),
            }
        }

        for route in self.container.host.routes().routes() {
            info!(route = %route.prefix, fragment = %route.fragment, "Route registered");
        }

        self.navigate("/").await
    }

    pub async fn navigate(&self, path: &str) -> RouteView {
        self.container.host.navigate(path).await
    }

    pub fn view(&self) -> RouteView {
        self.container.host.view()
    }

    /// Request a state change, as the shell header does.
    pub fn dispatch(&self, action: StateAction) -> StateChange {
        self.container.store.dispatch(action)
    }

    pub fn state(&self) -> Arc<AppState> {
        self.container.store.snapshot()
    }

    pub fn container(&self) -> &ShellContainer {
        &self.container
    }

    /// Unmount, release background listeners and the metrics taps.
    pub fn shutdown(&self) {
        info!("Initiating graceful shutdown...");
        self.container.host.shutdown();
        self.container
            .metrics_taps
            .iter()
            .for_each(Subscription::unsubscribe);
        info!(
            events_published = self.container.bus.events_published(),
            listener_failures = self.container.bus.listener_failures(),
            "Shutdown complete"
        );
    }
}
