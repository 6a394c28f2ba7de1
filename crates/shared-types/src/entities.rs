//! # Core Composition Entities
//!
//! Identities and static descriptors for the fragments the shell composes.
//!
//! ## Clusters
//!
//! - **Identity**: `FragmentName`
//! - **Configuration**: `RemoteDescriptor`
//! - **Lifecycle Policy**: `ListenPolicy`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// IDENTITY
// =============================================================================

/// Logical name of a fragment ("workout", "food", "analytics").
///
/// The name is the key used by the registry cache and by the route table.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FragmentName(String);

impl FragmentName {
    /// Create a fragment name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow the name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FragmentName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for FragmentName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for FragmentName {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl AsRef<str> for FragmentName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// =============================================================================
// CONFIGURATION
// =============================================================================

/// Where a remote fragment lives and which export it mounts through.
///
/// Supplied to the registry at host start-up and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDescriptor {
    /// Logical fragment name.
    pub name: FragmentName,
    /// Location of the remote entry (manifest) for this fragment.
    pub url: String,
    /// Name of the exposed root export, e.g. `./WorkoutApp`.
    pub entry_export: String,
}

impl RemoteDescriptor {
    /// Build a descriptor.
    #[must_use]
    pub fn new(
        name: impl Into<FragmentName>,
        url: impl Into<String>,
        entry_export: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            entry_export: entry_export.into(),
        }
    }
}

// =============================================================================
// LIFECYCLE POLICY
// =============================================================================

/// What happens to a fragment's bus subscriptions when its route unmounts.
///
/// Declared by each fragment, never chosen by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListenPolicy {
    /// Subscriptions are released together with the route.
    #[default]
    Routed,
    /// Subscriptions outlive the route and are released at host shutdown.
    Background,
}
