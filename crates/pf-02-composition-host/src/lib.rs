//! # PF-02 Composition Host
//!
//! Maps routed path prefixes to fragments, loads them through the remote
//! registry on first navigation and mounts them into a single outlet. Also
//! owns the shared application state store.
//!
//! ## Architecture
//!
//! - **Domain Layer** (`domain/`): `RouteTable` and `RouteView`
//! - **Ports Layer** (`ports/`):
//!   - `CompositionApi`: driving port used by the shell's router
//!   - `HostObserver`: driven port for lifecycle notifications
//! - **Service Layer** (`service.rs`): `CompositionHost`
//! - **State** (`state.rs`): `AppStore`, the host-owned `StateAccess`
//!
//! ## Invariants
//!
//! - **Failure isolation**: a fragment that cannot be loaded or mounted shows
//!   an error placeholder for its own route; every other route keeps working.
//! - **Subscription cleanup**: unmounting releases every bus subscription the
//!   fragment made, unless the fragment declares `ListenPolicy::Background`.
//! - **No cancellation**: a slow load is reported as stalled, never aborted.
//!
//! ## Usage Example
//!
//! ```ignore
//! let host = CompositionHost::new(routes, registry, bus, store);
//!
//! match host.navigate("/workout/history").await {
//!     RouteView::Mounted { view, .. } => println!("{view}"),
//!     other => println!("{other}"),
//! }
//! ```

pub mod domain;
pub mod ports;
pub mod service;
pub mod state;

// Re-exports for convenience
pub use domain::{Route, RouteError, RouteErrorKind, RouteMatch, RouteTable, RouteView};
pub use ports::{CompositionApi, HostObserver, NoopObserver};
pub use service::{CompositionHost, HostConfig};
pub use state::AppStore;
