//! Host-owned application state store.
//!
//! Holds the only mutable copy of `AppState`. Fragments see it through
//! `StateAccess`: immutable snapshots and named actions.
//!
//! Announcements happen after the write lock is released. Two dispatches
//! racing on different threads may therefore announce out of version order;
//! listeners that care compare the `version` carried by each event. The shell
//! dispatches from a single task, where announcements follow commit order.

use parking_lot::RwLock;
use shared_bus::{EventBus, EventPublisher, Topic};
use shared_types::{
    AppState, StateAccess, StateAction, StateChange, ThemeChanged, UserUpdated,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The host's state container.
pub struct AppStore {
    state: RwLock<Arc<AppState>>,
    bus: Arc<EventBus>,
}

impl AppStore {
    #[must_use]
    pub fn new(initial: AppState, bus: Arc<EventBus>) -> Self {
        Self {
            state: RwLock::new(Arc::new(initial)),
            bus,
        }
    }

    /// Announce a committed change on the bus.
    fn announce(&self, change: StateChange, snapshot: &AppState) {
        let outcome = match change {
            StateChange::Unchanged => return,
            StateChange::Theme(theme) => self.bus.publish_typed(
                Topic::ThemeChanged,
                &ThemeChanged {
                    theme,
                    version: snapshot.version,
                },
            ),
            StateChange::User | StateChange::Auth { .. } => self.bus.publish_typed(
                Topic::UserUpdated,
                &UserUpdated {
                    user: snapshot.user.clone(),
                    logged_in: snapshot.auth.is_logged_in,
                    version: snapshot.version,
                },
            ),
            // No catalogue topic carries unit changes; fragments read them from snapshots.
            StateChange::Units(units) => {
                debug!(?units, version = snapshot.version, "Units changed");
                return;
            }
        };

        if let Err(e) = outcome {
            warn!(error = %e, "Failed to announce state change");
        }
    }
}

impl StateAccess for AppStore {
    fn snapshot(&self) -> Arc<AppState> {
        self.state.read().clone()
    }

    /// Commit `action` and announce the change.
    ///
    /// Commits are serialized by the write lock; announcements are not.
    fn dispatch(&self, action: StateAction) -> StateChange {
        let (change, snapshot) = {
            let mut guard = self.state.write();
            let mut next = AppState::clone(&guard);
            let change = next.apply(action);
            if change == StateChange::Unchanged {
                return change;
            }
            let next = Arc::new(next);
            *guard = next.clone();
            (change, next)
        };

        info!(?change, version = snapshot.version, "Application state changed");
        // Published after the write lock is released so listeners can read the new snapshot.
        self.announce(change, &snapshot);
        change
    }
}

impl std::fmt::Debug for AppStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppStore")
            .field("version", &self.state.read().version)
            .finish()
    }
}
