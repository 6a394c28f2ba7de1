//! What the outlet shows for the current navigation.

use serde::Serialize;
use shared_types::{FragmentName, RegistryError};
use std::fmt;

/// Why a route shows the error placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteErrorKind {
    /// The route names a fragment missing from the remote configuration.
    UnknownRemote,
    /// The remote could not be fetched or bound.
    RemoteLoad,
    /// The fragment's mount factory refused to mount.
    Mount,
}

impl RouteErrorKind {
    /// Whether re-navigating may succeed.
    #[must_use]
    pub fn is_retryable(self) -> bool {
        !matches!(self, Self::UnknownRemote)
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::UnknownRemote => "unknown_remote",
            Self::RemoteLoad => "remote_load",
            Self::Mount => "mount",
        }
    }
}

impl From<&RegistryError> for RouteErrorKind {
    fn from(error: &RegistryError) -> Self {
        match error {
            RegistryError::UnknownRemote { .. } => Self::UnknownRemote,
            RegistryError::RemoteLoad { .. } => Self::RemoteLoad,
        }
    }
}

impl fmt::Display for RouteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The outlet's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum RouteView {
    /// The host's own landing view at `/`.
    Home,

    /// Loading placeholder. `stalled` once the load outlives the stall threshold.
    Loading {
        prefix: String,
        fragment: FragmentName,
        stalled: bool,
    },

    /// A mounted fragment and its rendered output.
    Mounted {
        prefix: String,
        fragment: FragmentName,
        sub_path: String,
        view: String,
    },

    /// Error placeholder for this route only.
    Error {
        prefix: String,
        fragment: FragmentName,
        kind: RouteErrorKind,
        message: String,
        retry: bool,
    },

    /// No route covers the path.
    NotFound { path: String },
}

impl RouteView {
    #[must_use]
    pub fn error(prefix: &str, fragment: &FragmentName, kind: RouteErrorKind, message: String) -> Self {
        Self::Error {
            prefix: prefix.to_string(),
            fragment: fragment.clone(),
            kind,
            message,
            retry: kind.is_retryable(),
        }
    }

    #[must_use]
    pub fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted { .. })
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}

impl fmt::Display for RouteView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Home => f.write_str("Welcome to FitLog"),
            Self::Loading { fragment, stalled: false, .. } => write!(f, "Loading {fragment}..."),
            Self::Loading { fragment, stalled: true, .. } => {
                write!(f, "Loading {fragment}... (this is taking longer than usual)")
            }
            Self::Mounted { view, .. } => f.write_str(view),
            Self::Error { fragment, message, retry, .. } => {
                write!(f, "{fragment} is unavailable: {message}")?;
                if *retry {
                    f.write_str(" [retry]")?;
                }
                Ok(())
            }
            Self::NotFound { path } => write!(f, "Nothing at {path}"),
        }
    }
}
