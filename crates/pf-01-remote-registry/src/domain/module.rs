//! The contract a remote fragment satisfies to be loadable and mountable.

use shared_bus::ScopedBus;
use shared_types::{FragmentName, ListenPolicy, MountError, StateAccess};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// A resolved module, shared by every resolution of the same name.
pub type LoadedModule = Arc<dyn RemoteModule>;

/// What the host injects into a fragment at mount time.
#[derive(Clone)]
pub struct FragmentContext {
    /// The fragment's own view of the bus; released by the host on unmount.
    pub bus: Arc<ScopedBus>,
    /// Snapshot reads and named state actions.
    pub state: Arc<dyn StateAccess>,
    /// Route prefix the host assigned to this fragment.
    pub base_path: String,
}

impl fmt::Debug for FragmentContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FragmentContext")
            .field("owner", self.bus.owner())
            .field("base_path", &self.base_path)
            .finish()
    }
}

/// A mounted fragment's root.
pub trait FragmentInstance: Send + Sync {
    /// Render the fragment's current view.
    fn render(&self) -> String;

    /// Handle navigation beneath the fragment's prefix.
    fn navigate(&mut self, _sub_path: &str) {}

    /// Called once before the host tears the route down.
    fn unmount(&mut self) {}
}

/// The single root export of a remote module.
pub trait RemoteModule: Send + Sync {
    /// Logical fragment name.
    fn name(&self) -> &FragmentName;

    /// Name of the exposed export, e.g. `./WorkoutApp`.
    fn entry_export(&self) -> &str;

    /// Whether subscriptions outlive the route. Declared by the fragment.
    fn listen_policy(&self) -> ListenPolicy {
        ListenPolicy::Routed
    }

    /// Produce the fragment's root.
    fn mount(&self, context: FragmentContext) -> Result<Box<dyn FragmentInstance>, MountError>;
}

impl fmt::Debug for dyn RemoteModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteModule")
            .field("name", self.name())
            .field("entry_export", &self.entry_export())
            .field("listen_policy", &self.listen_policy())
            .finish()
    }
}

/// Locally linked module factories, keyed by exposed export name.
#[derive(Clone, Default)]
pub struct ModuleCatalog {
    modules: HashMap<String, LoadedModule>,
}

impl ModuleCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module under its own export name, replacing any previous one.
    #[must_use]
    pub fn with(mut self, module: LoadedModule) -> Self {
        self.insert(module);
        self
    }

    pub fn insert(&mut self, module: LoadedModule) {
        self.modules.insert(module.entry_export().to_string(), module);
    }

    #[must_use]
    pub fn get(&self, export: &str) -> Option<LoadedModule> {
        self.modules.get(export).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl fmt::Debug for ModuleCatalog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut exports: Vec<_> = self.modules.keys().collect();
        exports.sort();
        f.debug_struct("ModuleCatalog").field("exports", &exports).finish()
    }
}
