//! Ports layer: the host's driving API and its observation hook.

pub mod inbound;
pub mod outbound;

pub use inbound::CompositionApi;
pub use outbound::{HostObserver, NoopObserver};
