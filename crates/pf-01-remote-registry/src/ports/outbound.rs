//! Outbound Ports (Driven Ports)
//!
//! How the registry reaches the network.

use async_trait::async_trait;
use shared_types::{FetchError, RemoteDescriptor};

use crate::domain::LoadedModule;

/// Fetches a remote entry and binds its exposed export (Driven Port)
///
/// The registry calls this at most once per in-flight load. Implementations
/// impose no timeout of their own beyond what the transport does.
#[async_trait]
pub trait ModuleFetcher: Send + Sync {
    async fn fetch(&self, descriptor: &RemoteDescriptor) -> Result<LoadedModule, FetchError>;
}
