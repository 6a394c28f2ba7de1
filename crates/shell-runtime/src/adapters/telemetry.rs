//! Metrics-recording implementations of the bus, registry and host ports.

use async_trait::async_trait;
use pf_01_remote_registry::{LoadedModule, ModuleFetcher};
use pf_02_composition_host::{HostObserver, RouteErrorKind};
use pulse_telemetry::{
    BUS_EVENTS_PUBLISHED, BUS_LISTENER_FAILURES, FRAGMENTS_MOUNTED, REMOTE_LOADS,
    REMOTE_LOAD_DURATION, ROUTE_MOUNTS,
};
use shared_bus::{ErrorReporter, EventBus, ListenerFailure, Subscription, Topic, TracingReporter};
use shared_types::{FetchError, FragmentName, RemoteDescriptor};
use std::sync::Arc;
use std::time::Instant;

/// Logs listener failures and counts them per topic.
#[derive(Debug, Default)]
pub struct TelemetryReporter {
    log: TracingReporter,
}

impl ErrorReporter for TelemetryReporter {
    fn report(&self, failure: &ListenerFailure) {
        BUS_LISTENER_FAILURES
            .with_label_values(&[failure.topic.as_str()])
            .inc();
        self.log.report(failure);
    }
}

/// Subscribe a counting listener to every catalogue topic.
///
/// The returned subscriptions stay active until unsubscribed.
pub fn tap_bus_metrics(bus: &EventBus) -> Vec<Subscription> {
    Topic::ALL
        .iter()
        .map(|&topic| {
            bus.subscribe(topic, move |_| {
                BUS_EVENTS_PUBLISHED.with_label_values(&[topic.as_str()]).inc();
                Ok(())
            })
        })
        .collect()
}

/// Wraps a fetcher, timing and counting every fetch.
pub struct InstrumentedFetcher {
    inner: Arc<dyn ModuleFetcher>,
}

impl InstrumentedFetcher {
    pub fn new(inner: Arc<dyn ModuleFetcher>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ModuleFetcher for InstrumentedFetcher {
    async fn fetch(&self, descriptor: &RemoteDescriptor) -> Result<LoadedModule, FetchError> {
        let remote = descriptor.name.as_str();
        let started = Instant::now();
        let result = self.inner.fetch(descriptor).await;

        REMOTE_LOAD_DURATION
            .with_label_values(&[remote])
            .observe(started.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "ready" } else { "failed" };
        REMOTE_LOADS.with_label_values(&[remote, outcome]).inc();

        result
    }
}

/// Records route outcomes and the mounted-fragment gauge.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricsObserver;

impl HostObserver for MetricsObserver {
    fn route_mounted(&self, prefix: &str, _fragment: &FragmentName) {
        ROUTE_MOUNTS.with_label_values(&[prefix, "mounted"]).inc();
        FRAGMENTS_MOUNTED.inc();
    }

    fn route_failed(&self, prefix: &str, _fragment: &FragmentName, kind: RouteErrorKind) {
        ROUTE_MOUNTS.with_label_values(&[prefix, kind.as_str()]).inc();
    }

    fn route_unmounted(&self, _prefix: &str, _fragment: &FragmentName) {
        FRAGMENTS_MOUNTED.dec();
    }
}
