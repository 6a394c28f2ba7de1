//! Ports layer: the registry's driving and driven interfaces.

pub mod inbound;
pub mod outbound;

pub use inbound::RemoteRegistryApi;
pub use outbound::ModuleFetcher;
