//! Inbound Ports (Driving Ports)
//!
//! The API the composition host uses to resolve fragments.

use async_trait::async_trait;
use shared_types::{FragmentName, RegistryError};

use crate::domain::{LoadStatus, LoadedModule};

/// Primary registry API (Driving Port)
#[async_trait]
pub trait RemoteRegistryApi: Send + Sync {
    /// Resolve `name` to its module, loading it on first use.
    ///
    /// # Errors
    ///
    /// - `UnknownRemote` if `name` is not configured; no fetch is attempted.
    /// - `RemoteLoad` if the fetch failed; a later call retries.
    async fn resolve(&self, name: &FragmentName) -> Result<LoadedModule, RegistryError>;

    /// Load state of `name`, or `None` if it is not configured.
    fn status(&self, name: &FragmentName) -> Option<LoadStatus>;

    /// Resolve and discard, warming the cache.
    async fn preload(&self, name: &FragmentName) -> Result<(), RegistryError> {
        self.resolve(name).await.map(|_| ())
    }
}
