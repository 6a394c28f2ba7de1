//! Remote Module Registry Service
//!
//! Resolves fragment names to loaded modules with a per-name state machine:
//!
//! ```text
//! NotStarted ──resolve──→ Loading ──ok──→ Ready
//!                            │
//!                            └──err──→ Failed ──resolve──→ Loading
//! ```
//!
//! Concurrent resolutions of a name that is `Loading` await the same shared
//! future instead of fetching again.

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::Mutex;
use shared_types::{FetchError, FragmentName, RegistryError, RemoteDescriptor};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::domain::{LoadStatus, LoadedModule};
use crate::ports::{ModuleFetcher, RemoteRegistryApi};

type LoadOutcome = Result<LoadedModule, FetchError>;
type InFlight = Shared<BoxFuture<'static, LoadOutcome>>;

/// Internal state of a cache entry.
#[derive(Default)]
enum EntryState {
    #[default]
    NotStarted,
    Loading(InFlight),
    Ready(LoadedModule),
    Failed(FetchError),
}

/// Cache entry for one fragment name.
#[derive(Default)]
struct CacheEntry {
    state: EntryState,
    /// Incremented per fetch so a stale completion can't overwrite a newer attempt.
    generation: u64,
}

/// Remote Module Registry implementation
///
/// Implements the `RemoteRegistryApi` port using an injected `ModuleFetcher`.
pub struct RemoteModuleRegistry {
    /// Static configuration, never mutated after construction.
    descriptors: HashMap<FragmentName, RemoteDescriptor>,
    /// Network fetcher (driven port).
    fetcher: Arc<dyn ModuleFetcher>,
    /// Per-name load state. Never held across an await.
    cache: Mutex<HashMap<FragmentName, CacheEntry>>,
}

impl RemoteModuleRegistry {
    /// Create a registry over a fixed set of descriptors.
    pub fn new(
        descriptors: impl IntoIterator<Item = RemoteDescriptor>,
        fetcher: Arc<dyn ModuleFetcher>,
    ) -> Self {
        let descriptors = descriptors
            .into_iter()
            .map(|descriptor| (descriptor.name.clone(), descriptor))
            .collect();

        Self {
            descriptors,
            fetcher,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Descriptor configured for `name`.
    #[must_use]
    pub fn descriptor(&self, name: &FragmentName) -> Option<&RemoteDescriptor> {
        self.descriptors.get(name)
    }

    /// All configured fragment names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<FragmentName> {
        let mut names: Vec<_> = self.descriptors.keys().cloned().collect();
        names.sort();
        names
    }

    /// The cached module, if `name` is `Ready`. Never triggers a load.
    #[must_use]
    pub fn cached(&self, name: &FragmentName) -> Option<LoadedModule> {
        match self.cache.lock().get(name).map(|entry| &entry.state) {
            Some(EntryState::Ready(module)) => Some(module.clone()),
            _ => None,
        }
    }

    /// Join the in-flight load for `name`, or start one.
    ///
    /// Returns the module directly on a cache hit.
    fn begin(
        &self,
        name: &FragmentName,
        descriptor: &RemoteDescriptor,
    ) -> Result<LoadedModule, (InFlight, u64)> {
        let mut cache = self.cache.lock();
        let entry = cache.entry(name.clone()).or_default();

        match &entry.state {
            EntryState::Ready(module) => {
                debug!(remote = %name, "Remote cache hit");
                Ok(module.clone())
            }
            EntryState::Loading(in_flight) => {
                debug!(remote = %name, generation = entry.generation, "Joining in-flight load");
                Err((in_flight.clone(), entry.generation))
            }
            EntryState::NotStarted | EntryState::Failed(_) => {
                entry.generation += 1;
                let in_flight = self.start_fetch(descriptor.clone());
                entry.state = EntryState::Loading(in_flight.clone());
                info!(
                    remote = %name,
                    url = %descriptor.url,
                    generation = entry.generation,
                    "Loading remote"
                );
                Err((in_flight, entry.generation))
            }
        }
    }

    fn start_fetch(&self, descriptor: RemoteDescriptor) -> InFlight {
        let fetcher = self.fetcher.clone();
        async move { fetcher.fetch(&descriptor).await }
            .boxed()
            .shared()
    }

    /// Record the outcome of a load, unless a newer attempt replaced it.
    fn settle(&self, name: &FragmentName, generation: u64, outcome: &LoadOutcome) {
        let mut cache = self.cache.lock();
        let Some(entry) = cache.get_mut(name) else {
            return;
        };
        if entry.generation != generation || !matches!(entry.state, EntryState::Loading(_)) {
            return;
        }

        entry.state = match outcome {
            Ok(module) => {
                info!(remote = %name, generation, "Remote ready");
                EntryState::Ready(module.clone())
            }
            Err(error) => {
                warn!(remote = %name, generation, error = %error, "Remote failed to load");
                EntryState::Failed(error.clone())
            }
        };
    }
}

#[async_trait]
impl RemoteRegistryApi for RemoteModuleRegistry {
    async fn resolve(&self, name: &FragmentName) -> Result<LoadedModule, RegistryError> {
        let Some(descriptor) = self.descriptors.get(name) else {
            warn!(remote = %name, "Resolution of unknown remote");
            return Err(RegistryError::UnknownRemote { name: name.clone() });
        };

        let (in_flight, generation) = match self.begin(name, descriptor) {
            Ok(module) => return Ok(module),
            Err(pending) => pending,
        };

        let outcome = in_flight.await;
        self.settle(name, generation, &outcome);

        outcome.map_err(|error| RegistryError::RemoteLoad {
            name: name.clone(),
            reason: error.to_string(),
        })
    }

    fn status(&self, name: &FragmentName) -> Option<LoadStatus> {
        if !self.descriptors.contains_key(name) {
            return None;
        }

        let status = match self.cache.lock().get(name).map(|entry| &entry.state) {
            None | Some(EntryState::NotStarted) => LoadStatus::NotStarted,
            Some(EntryState::Loading(_)) => LoadStatus::Loading,
            Some(EntryState::Ready(_)) => LoadStatus::Ready,
            Some(EntryState::Failed(error)) => LoadStatus::Failed(error.to_string()),
        };
        Some(status)
    }
}

impl std::fmt::Debug for RemoteModuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteModuleRegistry")
            .field("remotes", &self.names())
            .finish()
    }
}
