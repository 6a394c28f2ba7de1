//! # Event Subscriber
//!
//! Defines the subscription side of the event bus: listener registrations
//! and the handles used to cancel them.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use thiserror::Error;
use tracing::debug;

use crate::events::{Payload, Topic};

/// Why a single listener failed during dispatch.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ListenerError {
    /// The listener returned an error.
    #[error("listener rejected event: {0}")]
    Rejected(String),

    /// A typed listener could not decode the payload.
    #[error("payload does not decode as {expected}: {reason}")]
    Decode { expected: &'static str, reason: String },

    /// The listener panicked.
    #[error("listener panicked: {0}")]
    Panicked(String),
}

/// Outcome of a single listener invocation.
pub type ListenerResult = Result<(), ListenerError>;

/// Callback invoked for each delivered payload.
pub(crate) type Callback = Box<dyn Fn(&Payload) -> ListenerResult + Send + Sync>;

/// Registration identifier, unique per bus and increasing in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(pub u64);

impl fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sub-{}", self.0)
    }
}

/// A registered listener.
pub(crate) struct Listener {
    pub(crate) id: SubscriptionId,
    pub(crate) once: bool,
    /// Cleared by cancellation, or by the single delivery of a once-listener.
    active: AtomicBool,
    callback: Callback,
}

impl Listener {
    pub(crate) fn new(id: SubscriptionId, once: bool, callback: Callback) -> Self {
        Self {
            id,
            once,
            active: AtomicBool::new(true),
            callback,
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Returns `true` only for the caller that actually deactivated it.
    pub(crate) fn deactivate(&self) -> bool {
        self.active.swap(false, Ordering::AcqRel)
    }

    pub(crate) fn invoke(&self, payload: &Payload) -> ListenerResult {
        (self.callback)(payload)
    }
}

/// Listeners per topic, each list kept in registration order.
pub(crate) type ListenerTable = HashMap<Topic, Vec<Arc<Listener>>>;

/// Remove a listener from the table. Missing entries are ignored.
pub(crate) fn remove_listener(table: &Mutex<ListenerTable>, topic: Topic, id: SubscriptionId) {
    let mut table = table.lock();
    if let Some(listeners) = table.get_mut(&topic) {
        listeners.retain(|listener| listener.id != id);
        if listeners.is_empty() {
            table.remove(&topic);
        }
    }
}

/// Cancellation handle returned by `subscribe` and `subscribe_once`.
///
/// Dropping the handle does NOT cancel the registration; call `unsubscribe`,
/// or subscribe through a `ScopedBus` to have cancellation tied to a scope.
pub struct Subscription {
    topic: Topic,
    listener: Arc<Listener>,
    table: Weak<Mutex<ListenerTable>>,
}

impl Subscription {
    pub(crate) fn new(
        topic: Topic,
        listener: Arc<Listener>,
        table: Weak<Mutex<ListenerTable>>,
    ) -> Self {
        Self {
            topic,
            listener,
            table,
        }
    }

    /// Cancel the registration.
    ///
    /// Takes effect immediately: a listener not yet invoked in an in-flight
    /// dispatch is skipped. Calling this more than once, or after a
    /// once-listener already fired, is a no-op.
    pub fn unsubscribe(&self) {
        let was_active = self.listener.deactivate();
        if let Some(table) = self.table.upgrade() {
            remove_listener(&table, self.topic, self.listener.id);
        }
        if was_active {
            debug!(topic = %self.topic, subscription = %self.listener.id, "Unsubscribed");
        }
    }

    /// Whether the listener can still receive deliveries.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.listener.is_active()
    }

    #[must_use]
    pub fn topic(&self) -> Topic {
        self.topic
    }

    #[must_use]
    pub fn id(&self) -> SubscriptionId {
        self.listener.id
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("topic", &self.topic)
            .field("id", &self.listener.id)
            .field("once", &self.listener.once)
            .field("active", &self.is_active())
            .finish()
    }
}
