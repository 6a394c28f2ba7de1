//! Load state of a cache entry, as observed from outside the registry.

use std::fmt;

/// Where a fragment is in its load lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    /// Configured but never requested.
    NotStarted,
    /// A fetch is in flight.
    Loading,
    /// Loaded and cached.
    Ready,
    /// The last attempt failed; the next resolution retries.
    Failed(String),
}

impl LoadStatus {
    #[must_use]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready)
    }
}

impl fmt::Display for LoadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not-started"),
            Self::Loading => write!(f, "loading"),
            Self::Ready => write!(f, "ready"),
            Self::Failed(reason) => write!(f, "failed ({reason})"),
        }
    }
}
