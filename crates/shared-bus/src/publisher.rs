//! # Event Publisher
//!
//! The process-wide event bus and its publishing side.
//!
//! ## Delivery Semantics
//!
//! - `publish` is synchronous: it returns once every listener registered at
//!   dispatch start has been invoked or has failed.
//! - Listeners run in registration order and all receive the same payload.
//! - The listener list is snapshotted when dispatch starts. A listener added
//!   mid-dispatch waits for the next publish; a listener cancelled
//!   mid-dispatch is skipped if it has not run yet.
//! - A listener failure (error or panic) is reported and never reaches the
//!   publisher.

use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, trace};

use crate::events::{Payload, Topic};
use crate::reporter::{ErrorReporter, ListenerFailure, TracingReporter};
use crate::subscriber::{
    remove_listener, Callback, Listener, ListenerError, ListenerResult, ListenerTable,
    Subscription, SubscriptionId,
};

/// Errors a publisher can observe. Raised before dispatch starts.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BusError {
    #[error("Failed to encode payload for {topic}: {reason}")]
    Encode { topic: Topic, reason: String },
}

/// Trait for publishing events to the bus.
///
/// Implemented by the bus itself and by every `ScopedBus` handed to fragments.
pub trait EventPublisher: Send + Sync {
    /// Deliver `payload` to every listener of `topic`.
    fn publish(&self, topic: Topic, payload: &Payload);

    /// Serialise `payload` and publish it.
    fn publish_typed<T: Serialize>(&self, topic: Topic, payload: &T) -> Result<(), BusError>
    where
        Self: Sized,
    {
        let value = serde_json::to_value(payload).map_err(|e| BusError::Encode {
            topic,
            reason: e.to_string(),
        })?;
        self.publish(topic, &value);
        Ok(())
    }
}

/// In-memory, synchronous publish/subscribe bus.
///
/// Created once by the host at start-up and injected into fragments; there
/// is no ambient global instance.
pub struct EventBus {
    /// Listeners by topic.
    listeners: Arc<Mutex<ListenerTable>>,

    /// Next subscription id.
    next_id: AtomicU64,

    /// Receives isolated listener failures.
    reporter: Arc<dyn ErrorReporter>,

    /// Total publish calls.
    events_published: AtomicU64,

    /// Total listener failures.
    listener_failures: AtomicU64,
}

impl EventBus {
    /// Create a bus that logs listener failures.
    #[must_use]
    pub fn new() -> Self {
        Self::with_reporter(Arc::new(TracingReporter))
    }

    /// Create a bus with a custom failure reporter.
    #[must_use]
    pub fn with_reporter(reporter: Arc<dyn ErrorReporter>) -> Self {
        Self {
            listeners: Arc::new(Mutex::new(ListenerTable::new())),
            next_id: AtomicU64::new(1),
            reporter,
            events_published: AtomicU64::new(0),
            listener_failures: AtomicU64::new(0),
        }
    }

    /// Register `callback` for every publish to `topic`.
    ///
    /// Registering the same callback twice yields two independent
    /// registrations.
    pub fn subscribe<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(&Payload) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(topic, false, Box::new(callback))
    }

    /// Register `callback` for the next publish to `topic` only.
    pub fn subscribe_once<F>(&self, topic: Topic, callback: F) -> Subscription
    where
        F: Fn(&Payload) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(topic, true, Box::new(callback))
    }

    /// Register a listener that receives payloads decoded as `T`.
    ///
    /// A payload that fails to decode is reported as a listener failure.
    pub fn subscribe_typed<T, F>(&self, topic: Topic, callback: F) -> Subscription
    where
        T: DeserializeOwned + 'static,
        F: Fn(T) -> ListenerResult + Send + Sync + 'static,
    {
        self.register(topic, false, typed_callback(callback))
    }

    /// Number of active registrations for `topic`.
    #[must_use]
    pub fn subscriber_count(&self, topic: Topic) -> usize {
        self.listeners
            .lock()
            .get(&topic)
            .map_or(0, |listeners| listeners.iter().filter(|l| l.is_active()).count())
    }

    /// Total number of publish calls.
    #[must_use]
    pub fn events_published(&self) -> u64 {
        self.events_published.load(Ordering::Relaxed)
    }

    /// Total number of isolated listener failures.
    #[must_use]
    pub fn listener_failures(&self) -> u64 {
        self.listener_failures.load(Ordering::Relaxed)
    }

    pub(crate) fn register(&self, topic: Topic, once: bool, callback: Callback) -> Subscription {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let listener = Arc::new(Listener::new(id, once, callback));

        self.listeners
            .lock()
            .entry(topic)
            .or_default()
            .push(listener.clone());

        debug!(topic = %topic, subscription = %id, once, "Listener registered");

        Subscription::new(topic, listener, Arc::downgrade(&self.listeners))
    }

    fn dispatch(&self, topic: Topic, payload: &Payload) -> usize {
        // Snapshot, then release the lock: listeners may re-enter the bus.
        let snapshot: Vec<Arc<Listener>> = self
            .listeners
            .lock()
            .get(&topic)
            .cloned()
            .unwrap_or_default();

        let mut invoked = 0;
        for listener in snapshot {
            if listener.once {
                if !listener.deactivate() {
                    continue;
                }
                remove_listener(&self.listeners, topic, listener.id);
            } else if !listener.is_active() {
                continue;
            }

            invoked += 1;
            let error = match catch_unwind(AssertUnwindSafe(|| listener.invoke(payload))) {
                Ok(Ok(())) => continue,
                Ok(Err(error)) => error,
                Err(panic) => ListenerError::Panicked(panic_message(panic.as_ref())),
            };

            self.listener_failures.fetch_add(1, Ordering::Relaxed);
            self.reporter.report(&ListenerFailure {
                topic,
                subscription_id: listener.id,
                error,
            });
        }
        invoked
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventPublisher for EventBus {
    fn publish(&self, topic: Topic, payload: &Payload) {
        self.events_published.fetch_add(1, Ordering::Relaxed);
        let invoked = self.dispatch(topic, payload);
        trace!(topic = %topic, listeners = invoked, "Event dispatched");
    }
}

impl std::fmt::Debug for EventBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventBus")
            .field("topics", &self.listeners.lock().len())
            .field("events_published", &self.events_published())
            .finish()
    }
}

pub(crate) fn typed_callback<T, F>(callback: F) -> Callback
where
    T: DeserializeOwned + 'static,
    F: Fn(T) -> ListenerResult + Send + Sync + 'static,
{
    Box::new(move |payload: &Payload| {
        let value = T::deserialize(payload).map_err(|e| ListenerError::Decode {
            expected: std::any::type_name::<T>(),
            reason: e.to_string(),
        })?;
        callback(value)
    })
}

/// Best-effort text of a caught panic payload.
pub fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
