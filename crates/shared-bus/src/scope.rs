//! # Scoped Subscriptions
//!
//! A `ScopedBus` is the view of the bus a mounted fragment receives. Every
//! subscription made through it is recorded, so the host can cancel all of
//! them when the fragment's route unmounts, or hand them over for
//! background retention when the fragment asked for that.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use shared_types::FragmentName;
use std::sync::Arc;
use tracing::debug;

use crate::events::{Payload, Topic};
use crate::publisher::{typed_callback, EventBus, EventPublisher};
use crate::subscriber::{ListenerResult, Subscription, SubscriptionId};

/// Per-fragment view of the event bus.
///
/// Subscriptions are cancelled by `release` or when the scope is dropped.
pub struct ScopedBus {
    bus: Arc<EventBus>,
    owner: FragmentName,
    subscriptions: Mutex<Vec<Subscription>>,
}

impl ScopedBus {
    #[must_use]
    pub fn new(bus: Arc<EventBus>, owner: FragmentName) -> Self {
        Self {
            bus,
            owner,
            subscriptions: Mutex::new(Vec::new()),
        }
    }

    /// The fragment that owns this scope.
    #[must_use]
    pub fn owner(&self) -> &FragmentName {
        &self.owner
    }

    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: Fn(&Payload) -> ListenerResult + Send + Sync + 'static,
    {
        self.track(self.bus.subscribe(topic, callback))
    }

    pub fn subscribe_once<F>(&self, topic: Topic, callback: F) -> SubscriptionId
    where
        F: Fn(&Payload) -> ListenerResult + Send + Sync + 'static,
    {
        self.track(self.bus.subscribe_once(topic, callback))
    }

    pub fn subscribe_typed<T, F>(&self, topic: Topic, callback: F) -> SubscriptionId
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> ListenerResult + Send + Sync + 'static,
    {
        self.track(self.bus.register(topic, false, typed_callback(callback)))
    }

    /// Cancel one subscription made through this scope.
    ///
    /// Returns `false` if the id is unknown to this scope.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut subscriptions = self.subscriptions.lock();
        let Some(index) = subscriptions.iter().position(|s| s.id() == id) else {
            return false;
        };
        subscriptions.remove(index).unsubscribe();
        true
    }

    /// Number of subscriptions still able to receive deliveries.
    #[must_use]
    pub fn active_subscriptions(&self) -> usize {
        let mut subscriptions = self.subscriptions.lock();
        // Once-listeners that already fired are dropped from the scope here.
        subscriptions.retain(Subscription::is_active);
        subscriptions.len()
    }

    /// Cancel every subscription made through this scope.
    ///
    /// Returns the number of registrations cancelled.
    pub fn release(&self) -> usize {
        let subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        let cancelled = subscriptions.iter().filter(|s| s.is_active()).count();
        for subscription in &subscriptions {
            subscription.unsubscribe();
        }
        if cancelled > 0 {
            debug!(fragment = %self.owner, cancelled, "Released scoped subscriptions");
        }
        cancelled
    }

    /// Take the subscriptions out of the scope without cancelling them.
    ///
    /// The caller becomes responsible for eventually calling `unsubscribe`.
    #[must_use]
    pub fn detach(&self) -> Vec<Subscription> {
        let mut subscriptions = std::mem::take(&mut *self.subscriptions.lock());
        subscriptions.retain(Subscription::is_active);
        subscriptions
    }

    fn track(&self, subscription: Subscription) -> SubscriptionId {
        let id = subscription.id();
        self.subscriptions.lock().push(subscription);
        id
    }
}

impl EventPublisher for ScopedBus {
    fn publish(&self, topic: Topic, payload: &Payload) {
        self.bus.publish(topic, payload);
    }
}

impl Drop for ScopedBus {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for ScopedBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopedBus")
            .field("owner", &self.owner)
            .field("subscriptions", &self.subscriptions.lock().len())
            .finish()
    }
}
