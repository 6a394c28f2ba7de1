//! HTTP remote-entry fetcher.
//!
//! A remote serves a small JSON manifest at its configured URL:
//!
//! ```json
//! { "name": "workout", "version": "1.4.0", "exposes": ["./WorkoutApp"] }
//! ```
//!
//! The manifest proves the remote is reachable and advertises the export;
//! the export itself is bound to the factory linked into the shell.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared_types::{FetchError, RemoteDescriptor};
use std::time::Duration;
use tracing::debug;

use crate::domain::{LoadedModule, ModuleCatalog};
use crate::ports::ModuleFetcher;

/// Remote-entry manifest served by each remote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteManifest {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    pub exposes: Vec<String>,
}

/// Check a manifest against its descriptor and bind the exposed export.
///
/// # Errors
///
/// - `Manifest` if the manifest names a different remote.
/// - `MissingExport` if the configured export is not advertised.
/// - `Unavailable` if no local factory is linked for the export.
pub fn bind_manifest(
    manifest: &RemoteManifest,
    descriptor: &RemoteDescriptor,
    catalog: &ModuleCatalog,
) -> Result<LoadedModule, FetchError> {
    if manifest.name != descriptor.name.as_str() {
        return Err(FetchError::Manifest(format!(
            "expected remote {}, manifest names {}",
            descriptor.name, manifest.name
        )));
    }

    if !manifest.exposes.iter().any(|e| e == &descriptor.entry_export) {
        return Err(FetchError::MissingExport {
            export: descriptor.entry_export.clone(),
        });
    }

    catalog.get(&descriptor.entry_export).ok_or_else(|| {
        FetchError::Unavailable(format!(
            "no factory linked for {}",
            descriptor.entry_export
        ))
    })
}

/// Fetches manifests over HTTP and binds them against a local catalogue.
#[derive(Debug)]
pub struct HttpManifestFetcher {
    client: Client,
    catalog: ModuleCatalog,
}

impl HttpManifestFetcher {
    /// Create a fetcher with the given request timeout.
    pub fn new(catalog: ModuleCatalog, timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(timeout)
            .connect_timeout(Duration::from_secs(2))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        Ok(Self { client, catalog })
    }
}

#[async_trait]
impl ModuleFetcher for HttpManifestFetcher {
    async fn fetch(&self, descriptor: &RemoteDescriptor) -> Result<LoadedModule, FetchError> {
        debug!(remote = %descriptor.name, url = %descriptor.url, "Fetching remote manifest");

        let response = self
            .client
            .get(&descriptor.url)
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    FetchError::Network(format!("cannot connect to {}", descriptor.url))
                } else {
                    FetchError::Network(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                url: descriptor.url.clone(),
            });
        }

        let manifest: RemoteManifest = response
            .json()
            .await
            .map_err(|e| FetchError::Manifest(e.to_string()))?;

        bind_manifest(&manifest, descriptor, &self.catalog)
    }
}
