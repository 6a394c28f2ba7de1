//! # Error Types
//!
//! Defines the error taxonomy shared by the registry, the host and the shell.

use crate::entities::FragmentName;
use thiserror::Error;

/// Errors surfaced by the Remote Module Registry.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// The name is not present in the remote configuration. No fetch is attempted.
    #[error("Unknown remote: {name}")]
    UnknownRemote { name: FragmentName },

    /// Fetching or binding the remote entry failed. Recoverable by retry.
    #[error("Failed to load remote {name}: {reason}")]
    RemoteLoad { name: FragmentName, reason: String },
}

impl RegistryError {
    /// The fragment this error refers to.
    #[must_use]
    pub fn fragment(&self) -> &FragmentName {
        match self {
            Self::UnknownRemote { name } | Self::RemoteLoad { name, .. } => name,
        }
    }

    /// Whether a later resolution of the same name may succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::RemoteLoad { .. })
    }
}

/// Reasons a single fetch of a remote entry can fail.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// Transport-level failure (connection refused, DNS, reset).
    #[error("Network error: {0}")]
    Network(String),

    /// The remote answered with a non-success status.
    #[error("Unexpected HTTP status {status} from {url}")]
    Status { status: u16, url: String },

    /// The remote entry could not be parsed.
    #[error("Malformed remote manifest: {0}")]
    Manifest(String),

    /// The remote does not expose the configured entry export.
    #[error("Remote does not expose {export}")]
    MissingExport { export: String },

    /// No local factory is linked for the export.
    #[error("Remote unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a fragment's mount factory.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MountError {
    /// The fragment refused to mount.
    #[error("Fragment {name} failed to mount: {reason}")]
    Rejected { name: FragmentName, reason: String },
}
