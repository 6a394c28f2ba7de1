//! # Listener Failure Reporting
//!
//! A failing listener never reaches the publisher. Its failure is handed to
//! an `ErrorReporter` and dispatch continues with the next listener.

use parking_lot::Mutex;
use tracing::warn;

use crate::events::Topic;
use crate::subscriber::{ListenerError, SubscriptionId};

/// A listener that failed during dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerFailure {
    pub topic: Topic,
    pub subscription_id: SubscriptionId,
    pub error: ListenerError,
}

/// Observability collaborator receiving isolated listener failures.
pub trait ErrorReporter: Send + Sync {
    fn report(&self, failure: &ListenerFailure);
}

/// Default reporter: logs each failure at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, failure: &ListenerFailure) {
        warn!(
            topic = %failure.topic,
            subscription = %failure.subscription_id,
            error = %failure.error,
            "Listener failed during dispatch"
        );
    }
}

/// Records every failure. Useful in tests.
#[derive(Debug, Default)]
pub struct CollectingReporter {
    failures: Mutex<Vec<ListenerFailure>>,
}

impl CollectingReporter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Failures reported so far, oldest first.
    #[must_use]
    pub fn failures(&self) -> Vec<ListenerFailure> {
        self.failures.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.failures.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.failures.lock().is_empty()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, failure: &ListenerFailure) {
        self.failures.lock().push(failure.clone());
    }
}
