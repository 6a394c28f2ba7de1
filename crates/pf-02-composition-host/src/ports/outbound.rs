//! Outbound Ports (Driven Ports)
//!
//! Lifecycle notifications the host emits. The shell implements this to
//! drive metrics; the host itself stays metrics-agnostic.

use shared_types::FragmentName;

use crate::domain::RouteErrorKind;

/// Observer of route lifecycle events (Driven Port)
pub trait HostObserver: Send + Sync {
    fn route_mounted(&self, _prefix: &str, _fragment: &FragmentName) {}

    fn route_failed(&self, _prefix: &str, _fragment: &FragmentName, _kind: RouteErrorKind) {}

    fn route_unmounted(&self, _prefix: &str, _fragment: &FragmentName) {}
}

/// Observer that ignores everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl HostObserver for NoopObserver {}
