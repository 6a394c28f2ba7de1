//! Composition Host Service
//!
//! Drives the single outlet through its states:
//!
//! ```text
//! navigate(path) ──no route──→ Home / NotFound
//!       │
//!       ├─ same prefix mounted ──→ forward sub-path, re-render
//!       │
//!       └─ unmount current ──→ Loading ──resolve ok──→ mount ──→ Mounted
//!                                 │                      └─err──→ Error(Mount)
//!                                 └──resolve err──→ Error(UnknownRemote | RemoteLoad)
//! ```
//!
//! Fragment code (mount, navigate, render, unmount) always runs with the
//! outlet lock released. A panic in fragment code is caught: the fragment's
//! subscriptions are released and the outlet shows `Error(Mount)`.

use async_trait::async_trait;
use parking_lot::Mutex;
use pf_01_remote_registry::{
    FragmentContext, FragmentInstance, LoadStatus, LoadedModule, RemoteRegistryApi,
};
use shared_bus::{panic_message, EventBus, ScopedBus, Subscription};
use shared_types::{FragmentName, ListenPolicy, MountError, StateAccess};
use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::domain::{RouteErrorKind, RouteMatch, RouteTable, RouteView};
use crate::ports::{CompositionApi, HostObserver, NoopObserver};

/// Host tuning.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// A load outliving this is reported as stalled. It is never cancelled.
    pub stall_after: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            stall_after: Duration::from_secs(3),
        }
    }
}

type SharedInstance = Arc<Mutex<Box<dyn FragmentInstance>>>;

/// Run fragment code, turning a panic into its message.
fn guarded<T>(call: impl FnOnce() -> T) -> Result<T, String> {
    catch_unwind(AssertUnwindSafe(call)).map_err(|panic| panic_message(panic.as_ref()))
}

fn panicked(prefix: &str, fragment: &FragmentName, message: &str) -> RouteView {
    RouteView::error(
        prefix,
        fragment,
        RouteErrorKind::Mount,
        format!("fragment panicked: {message}"),
    )
}

/// A fragment currently mounted in the outlet.
struct ActiveFragment {
    prefix: String,
    fragment: FragmentName,
    policy: ListenPolicy,
    sub_path: String,
    instance: SharedInstance,
    scope: Arc<ScopedBus>,
}

enum Slot {
    Empty,
    Home,
    NotFound(String),
    Loading {
        prefix: String,
        fragment: FragmentName,
        started: Instant,
    },
    Mounted(ActiveFragment),
    Failed(RouteView),
}

struct Outlet {
    /// Sequence number of the navigation that owns the slot.
    navigation: u64,
    slot: Slot,
}

/// Composition host implementation.
pub struct CompositionHost {
    routes: RouteTable,
    registry: Arc<dyn RemoteRegistryApi>,
    bus: Arc<EventBus>,
    state: Arc<dyn StateAccess>,
    config: HostConfig,
    observer: Arc<dyn HostObserver>,
    outlet: Mutex<Outlet>,
    /// Subscriptions kept alive for unmounted background fragments.
    retained: Mutex<HashMap<FragmentName, Vec<Subscription>>>,
}

impl CompositionHost {
    pub fn new(
        routes: RouteTable,
        registry: Arc<dyn RemoteRegistryApi>,
        bus: Arc<EventBus>,
        state: Arc<dyn StateAccess>,
    ) -> Self {
        Self {
            routes,
            registry,
            bus,
            state,
            config: HostConfig::default(),
            observer: Arc::new(NoopObserver),
            outlet: Mutex::new(Outlet {
                navigation: 0,
                slot: Slot::Empty,
            }),
            retained: Mutex::new(HashMap::new()),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn HostObserver>) -> Self {
        self.observer = observer;
        self
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }

    /// Number of retained background subscriptions still active.
    #[must_use]
    pub fn retained_subscriptions(&self) -> usize {
        self.retained
            .lock()
            .values()
            .flatten()
            .filter(|s| s.is_active())
            .count()
    }

    /// Claim the outlet for a new navigation, returning the displaced fragment.
    fn claim(&self, slot: Slot) -> (u64, Option<ActiveFragment>) {
        let mut outlet = self.outlet.lock();
        outlet.navigation += 1;
        let previous = std::mem::replace(&mut outlet.slot, slot);
        let displaced = match previous {
            Slot::Mounted(active) => Some(active),
            _ => None,
        };
        (outlet.navigation, displaced)
    }

    /// Replace the slot only if `navigation` still owns the outlet.
    fn settle(&self, navigation: u64, slot: Slot) -> Result<(), Slot> {
        let mut outlet = self.outlet.lock();
        if outlet.navigation != navigation {
            return Err(slot);
        }
        outlet.slot = slot;
        Ok(())
    }

    fn is_current(&self, navigation: u64) -> bool {
        self.outlet.lock().navigation == navigation
    }

    /// Forward a same-prefix navigation to the mounted instance.
    fn renavigate(&self, route: &RouteMatch) -> Option<RouteView> {
        let instance = {
            let mut outlet = self.outlet.lock();
            let Slot::Mounted(active) = &mut outlet.slot else {
                return None;
            };
            if active.prefix != route.prefix {
                return None;
            }
            active.sub_path = route.sub_path.clone();
            active.instance.clone()
        };

        let rendered = guarded(|| {
            let mut instance = instance.lock();
            instance.navigate(&route.sub_path);
            instance.render()
        });
        let view = match rendered {
            Ok(view) => view,
            Err(message) => {
                return Some(self.evict(&instance, &route.prefix, &route.fragment, &message));
            }
        };
        debug!(route = %route.prefix, sub_path = %route.sub_path, "Navigated within fragment");

        Some(RouteView::Mounted {
            prefix: route.prefix.clone(),
            fragment: route.fragment.clone(),
            sub_path: route.sub_path.clone(),
            view,
        })
    }

    /// Tear a fragment down: unmount hook, then release or retain its subscriptions.
    fn teardown(&self, active: ActiveFragment) {
        if let Err(message) = guarded(|| active.instance.lock().unmount()) {
            warn!(fragment = %active.fragment, error = %message, "Fragment panicked while unmounting");
        }

        match active.policy {
            ListenPolicy::Routed => {
                let released = active.scope.release();
                debug!(fragment = %active.fragment, released, "Released fragment subscriptions");
            }
            ListenPolicy::Background => {
                let kept = active.scope.detach();
                debug!(
                    fragment = %active.fragment,
                    kept = kept.len(),
                    "Retaining background subscriptions"
                );
                self.retained
                    .lock()
                    .entry(active.fragment.clone())
                    .or_default()
                    .extend(kept);
            }
        }

        info!(route = %active.prefix, fragment = %active.fragment, "Fragment unmounted");
        self.observer.route_unmounted(&active.prefix, &active.fragment);
    }

    /// Replace a mounted instance whose code panicked with an error view.
    ///
    /// Does nothing if `instance` no longer owns the outlet.
    fn evict(
        &self,
        instance: &SharedInstance,
        prefix: &str,
        fragment: &FragmentName,
        message: &str,
    ) -> RouteView {
        let view = panicked(prefix, fragment, message);
        let evicted = {
            let mut outlet = self.outlet.lock();
            let owns = matches!(
                &outlet.slot,
                Slot::Mounted(active) if Arc::ptr_eq(&active.instance, instance)
            );
            if owns {
                match std::mem::replace(&mut outlet.slot, Slot::Failed(view.clone())) {
                    Slot::Mounted(active) => Some(active),
                    _ => None,
                }
            } else {
                None
            }
        };

        let Some(active) = evicted else {
            return self.view();
        };
        let released = active.scope.release();
        warn!(
            route = %prefix,
            fragment = %fragment,
            released,
            error = %message,
            "Fragment panicked, evicted from outlet"
        );
        self.observer.route_failed(prefix, fragment, RouteErrorKind::Mount);
        view
    }

    /// Cancel subscriptions retained from an earlier mount of `fragment`.
    fn release_retained(&self, fragment: &FragmentName) {
        let retained = self.retained.lock().remove(fragment);
        if let Some(subscriptions) = retained {
            subscriptions.iter().for_each(Subscription::unsubscribe);
            debug!(
                fragment = %fragment,
                released = subscriptions.len(),
                "Released retained subscriptions"
            );
        }
    }

    /// Mount a resolved module for `route`.
    ///
    /// Subscriptions retained from an earlier background mount are only
    /// replaced once the new instance is up.
    fn mount(
        &self,
        route: &RouteMatch,
        module: &LoadedModule,
    ) -> Result<ActiveFragment, RouteView> {
        let policy = module.listen_policy();
        let scope = Arc::new(ScopedBus::new(self.bus.clone(), route.fragment.clone()));
        let context = FragmentContext {
            bus: scope.clone(),
            state: self.state.clone(),
            base_path: route.prefix.clone(),
        };

        let mounted = guarded(|| {
            let mut instance = module.mount(context)?;
            instance.navigate(&route.sub_path);
            Ok::<_, MountError>(instance)
        });
        let instance = match mounted {
            Ok(Ok(instance)) => instance,
            Ok(Err(e)) => {
                scope.release();
                return Err(RouteView::error(
                    &route.prefix,
                    &route.fragment,
                    RouteErrorKind::Mount,
                    e.to_string(),
                ));
            }
            Err(message) => {
                scope.release();
                return Err(panicked(&route.prefix, &route.fragment, &message));
            }
        };

        if policy == ListenPolicy::Background {
            self.release_retained(&route.fragment);
        }

        Ok(ActiveFragment {
            prefix: route.prefix.clone(),
            fragment: route.fragment.clone(),
            policy,
            sub_path: route.sub_path.clone(),
            instance: Arc::new(Mutex::new(instance)),
            scope,
        })
    }

    fn fail(&self, navigation: u64, route: &RouteMatch, view: RouteView) -> RouteView {
        if let RouteView::Error { kind, message, .. } = &view {
            warn!(
                route = %route.prefix,
                fragment = %route.fragment,
                %kind,
                error = %message,
                "Route failed"
            );
            self.observer.route_failed(&route.prefix, &route.fragment, *kind);
        }
        match self.settle(navigation, Slot::Failed(view.clone())) {
            Ok(()) => view,
            Err(_) => self.view(),
        }
    }

    fn render(active: &ActiveFragment) -> Result<RouteView, String> {
        let view = guarded(|| active.instance.lock().render())?;
        Ok(RouteView::Mounted {
            prefix: active.prefix.clone(),
            fragment: active.fragment.clone(),
            sub_path: active.sub_path.clone(),
            view,
        })
    }
}

#[async_trait]
impl CompositionApi for CompositionHost {
    async fn navigate(&self, path: &str) -> RouteView {
        let Some(route) = self.routes.resolve(path) else {
            let (slot, view) = if path == "/" {
                (Slot::Home, RouteView::Home)
            } else {
                (
                    Slot::NotFound(path.to_string()),
                    RouteView::NotFound {
                        path: path.to_string(),
                    },
                )
            };
            let (_, displaced) = self.claim(slot);
            if let Some(active) = displaced {
                self.teardown(active);
            }
            return view;
        };

        if let Some(view) = self.renavigate(&route) {
            return view;
        }

        // A cached module mounts without showing the loading placeholder.
        let cached = self.registry.status(&route.fragment) == Some(LoadStatus::Ready);
        let slot = if cached {
            Slot::Empty
        } else {
            Slot::Loading {
                prefix: route.prefix.clone(),
                fragment: route.fragment.clone(),
                started: Instant::now(),
            }
        };
        let (navigation, displaced) = self.claim(slot);
        if let Some(active) = displaced {
            self.teardown(active);
        }

        if !cached {
            info!(route = %route.prefix, fragment = %route.fragment, "Loading fragment");
        }
        let module = match self.registry.resolve(&route.fragment).await {
            Ok(module) => module,
            Err(e) => {
                let view = RouteView::error(
                    &route.prefix,
                    &route.fragment,
                    RouteErrorKind::from(&e),
                    e.to_string(),
                );
                return self.fail(navigation, &route, view);
            }
        };

        if !self.is_current(navigation) {
            debug!(route = %route.prefix, "Navigation superseded, discarding mount");
            return self.view();
        }

        let active = match self.mount(&route, &module) {
            Ok(active) => active,
            Err(view) => return self.fail(navigation, &route, view),
        };
        let view = match Self::render(&active) {
            Ok(view) => view,
            Err(message) => {
                active.scope.release();
                let view = panicked(&route.prefix, &route.fragment, &message);
                return self.fail(navigation, &route, view);
            }
        };

        match self.settle(navigation, Slot::Mounted(active)) {
            Ok(()) => {
                info!(route = %route.prefix, fragment = %route.fragment, "Fragment mounted");
                self.observer.route_mounted(&route.prefix, &route.fragment);
                view
            }
            Err(Slot::Mounted(stale)) => {
                self.teardown(stale);
                self.view()
            }
            Err(_) => self.view(),
        }
    }

    fn view(&self) -> RouteView {
        let (prefix, fragment, sub_path, instance) = {
            let outlet = self.outlet.lock();
            match &outlet.slot {
                Slot::Empty | Slot::Home => return RouteView::Home,
                Slot::NotFound(path) => return RouteView::NotFound { path: path.clone() },
                Slot::Loading {
                    prefix,
                    fragment,
                    started,
                } => {
                    return RouteView::Loading {
                        prefix: prefix.clone(),
                        fragment: fragment.clone(),
                        stalled: started.elapsed() >= self.config.stall_after,
                    }
                }
                Slot::Failed(view) => return view.clone(),
                Slot::Mounted(active) => (
                    active.prefix.clone(),
                    active.fragment.clone(),
                    active.sub_path.clone(),
                    active.instance.clone(),
                ),
            }
        };

        match guarded(|| instance.lock().render()) {
            Ok(view) => RouteView::Mounted {
                prefix,
                fragment,
                sub_path,
                view,
            },
            Err(message) => self.evict(&instance, &prefix, &fragment, &message),
        }
    }

    fn unmount(&self) -> bool {
        let (_, displaced) = self.claim(Slot::Empty);
        match displaced {
            Some(active) => {
                self.teardown(active);
                true
            }
            None => false,
        }
    }

    fn shutdown(&self) {
        self.unmount();
        let retained = std::mem::take(&mut *self.retained.lock());
        let released: usize = retained
            .values()
            .flatten()
            .filter(|s| s.is_active())
            .inspect(|s| s.unsubscribe())
            .count();
        info!(released, "Composition host shut down");
    }

    fn active_route(&self) -> Option<String> {
        match &self.outlet.lock().slot {
            Slot::Mounted(active) => Some(active.prefix.clone()),
            _ => None,
        }
    }
}

impl std::fmt::Debug for CompositionHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositionHost")
            .field("routes", &self.routes.len())
            .field("active_route", &self.active_route())
            .finish()
    }
}
