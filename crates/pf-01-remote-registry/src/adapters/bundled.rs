//! In-process fetcher over a `ModuleCatalog`.
//!
//! Used by the shell when fragments are linked into the binary, and by tests.
//! Supports simulated latency and injected failures so loading and error
//! placeholders can be exercised without a network.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{FetchError, FragmentName, RemoteDescriptor};
use std::collections::HashMap;
use std::time::Duration;
use tracing::debug;

use crate::domain::{LoadedModule, ModuleCatalog};
use crate::ports::ModuleFetcher;

/// Resolves descriptors against locally linked module factories.
#[derive(Debug)]
pub struct BundledFetcher {
    catalog: ModuleCatalog,
    latency: Option<Duration>,
    /// Remaining injected failures per fragment.
    failures: Mutex<HashMap<FragmentName, u32>>,
    fetches: Mutex<HashMap<FragmentName, u64>>,
}

impl BundledFetcher {
    #[must_use]
    pub fn new(catalog: ModuleCatalog) -> Self {
        Self {
            catalog,
            latency: None,
            failures: Mutex::new(HashMap::new()),
            fetches: Mutex::new(HashMap::new()),
        }
    }

    /// Delay every fetch by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Make the next `count` fetches of `name` fail with a network error.
    pub fn fail_next(&self, name: impl Into<FragmentName>, count: u32) {
        *self.failures.lock().entry(name.into()).or_default() += count;
    }

    /// Number of fetches issued for `name` so far.
    #[must_use]
    pub fn fetch_count(&self, name: &FragmentName) -> u64 {
        self.fetches.lock().get(name).copied().unwrap_or(0)
    }

    fn take_failure(&self, name: &FragmentName) -> bool {
        let mut failures = self.failures.lock();
        match failures.get_mut(name) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                true
            }
            _ => false,
        }
    }
}

#[async_trait]
impl ModuleFetcher for BundledFetcher {
    async fn fetch(&self, descriptor: &RemoteDescriptor) -> Result<LoadedModule, FetchError> {
        *self
            .fetches
            .lock()
            .entry(descriptor.name.clone())
            .or_default() += 1;

        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }

        if self.take_failure(&descriptor.name) {
            debug!(remote = %descriptor.name, "Injected fetch failure");
            return Err(FetchError::Network(format!(
                "connection to {} refused",
                descriptor.url
            )));
        }

        self.catalog
            .get(&descriptor.entry_export)
            .ok_or_else(|| FetchError::MissingExport {
                export: descriptor.entry_export.clone(),
            })
    }
}
