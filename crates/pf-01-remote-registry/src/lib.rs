//! # PF-01 Remote Module Registry
//!
//! Maps a logical fragment name to its remote location, loads the remote
//! entry on first use and caches the resolved module.
//!
//! ## Architecture
//!
//! This crate follows Hexagonal Architecture (Ports & Adapters):
//!
//! - **Domain Layer** (`domain/`): fragment contract and cache state
//!   - `RemoteModule` / `FragmentInstance`: what a loadable fragment exposes
//!   - `LoadStatus`: `NotStarted | Loading | Ready | Failed`
//!
//! - **Ports Layer** (`ports/`): trait definitions
//!   - `RemoteRegistryApi`: driving port used by the composition host
//!   - `ModuleFetcher`: driven port performing the network fetch
//!
//! - **Service Layer** (`service.rs`): `RemoteModuleRegistry`
//!
//! - **Adapters Layer** (`adapters/`): fetchers
//!   - `BundledFetcher`: in-process catalogue, no network
//!   - `HttpManifestFetcher`: remote-entry manifest over HTTP
//!
//! ## Invariants
//!
//! - **Single-flight**: at most one fetch in flight per fragment name;
//!   concurrent resolutions attach to it and receive the same module.
//! - **Retry after failure**: a failed load never poisons the cache.
//! - **Isolation**: one name's load never blocks or affects another's.
//!
//! ## Usage Example
//!
//! ```ignore
//! use pf_01_remote_registry::{BundledFetcher, ModuleCatalog, RemoteModuleRegistry};
//!
//! let fetcher = Arc::new(BundledFetcher::new(catalog));
//! let registry = RemoteModuleRegistry::new(descriptors, fetcher);
//!
//! let module = registry.resolve(&"workout".into()).await?;
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

// Re-exports for convenience
pub use adapters::{BundledFetcher, HttpManifestFetcher, RemoteManifest};
pub use domain::{
    FragmentContext, FragmentInstance, LoadStatus, LoadedModule, ModuleCatalog, RemoteModule,
};
pub use ports::{ModuleFetcher, RemoteRegistryApi};
pub use service::RemoteModuleRegistry;
pub use shared_types::{FetchError, RegistryError};
