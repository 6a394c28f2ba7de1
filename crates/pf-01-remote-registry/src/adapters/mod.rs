//! Adapters layer: concrete `ModuleFetcher` implementations.
//!
//! - `BundledFetcher`: modules linked into the shell binary
//! - `HttpManifestFetcher`: remote-entry manifests served over HTTP

pub mod bundled;
pub mod http;

pub use bundled::BundledFetcher;
pub use http::{bind_manifest, HttpManifestFetcher, RemoteManifest};
