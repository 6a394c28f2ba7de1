//! # Shell Configuration
//!
//! Remote descriptors, route table and host tuning, loaded from TOML.
//!
//! ## Config File Format
//!
//! ```toml
//! [shell]
//! stall_after_ms = 3000
//! fetch_mode = "bundled"        # or "http"
//! fetch_timeout_ms = 10000
//! preload = ["workout"]
//!
//! [user]
//! id = "1"
//! display_name = "Venkatesh"
//!
//! [remotes.workout]
//! url = "http://localhost:4001/remoteEntry.json"
//! entry_export = "./WorkoutApp"
//!
//! [routes]
//! "/workout" = "workout"
//! ```
//!
//! A missing file means the built-in defaults: three remotes on localhost
//! ports 4001-4003 routed at `/workout`, `/food` and `/analytics`.

use pf_02_composition_host::{HostConfig, RouteError, RouteTable};
use serde::Deserialize;
use shared_types::{RemoteDescriptor, UserProfile};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Environment variable overriding the config file location.
pub const CONFIG_ENV: &str = "PULSE_CONFIG";

/// Config file looked up in the working directory when nothing else is given.
pub const DEFAULT_CONFIG_FILE: &str = "pulse.toml";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {error}")]
    Io { path: String, error: String },

    #[error("Invalid config file: {0}")]
    Parse(String),

    #[error("Route {route} names unconfigured remote {remote}")]
    UnknownRouteTarget { route: String, remote: String },

    #[error("Remote {name} has an empty {field}")]
    EmptyField { name: String, field: &'static str },

    #[error("Preload names unconfigured remote {0}")]
    UnknownPreload(String),

    #[error(transparent)]
    Route(#[from] RouteError),
}

/// How remote entries are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FetchMode {
    /// Fragments linked into the binary; no network.
    #[default]
    Bundled,
    /// Remote-entry manifests fetched over HTTP.
    Http,
}

/// `[shell]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ShellSection {
    /// Loads slower than this are reported as stalled.
    pub stall_after_ms: u64,
    pub fetch_mode: FetchMode,
    /// Per-request timeout of the HTTP fetcher.
    pub fetch_timeout_ms: u64,
    /// Remotes resolved at start-up.
    pub preload: Vec<String>,
}

impl Default for ShellSection {
    fn default() -> Self {
        Self {
            stall_after_ms: 3_000,
            fetch_mode: FetchMode::Bundled,
            fetch_timeout_ms: 10_000,
            preload: Vec::new(),
        }
    }
}

/// `[user]` section: the signed-in user at start-up.
#[derive(Debug, Clone, Deserialize)]
pub struct UserSection {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl Default for UserSection {
    fn default() -> Self {
        Self {
            id: "1".to_string(),
            display_name: "Venkatesh".to_string(),
            email: Some("venkatesh@example.com".to_string()),
        }
    }
}

/// `[remotes.<name>]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteSection {
    pub url: String,
    pub entry_export: String,
}

/// Complete shell configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ShellConfig {
    #[serde(default)]
    pub shell: ShellSection,
    #[serde(default)]
    pub user: UserSection,
    #[serde(default = "default_remotes")]
    pub remotes: BTreeMap<String, RemoteSection>,
    #[serde(default = "default_routes")]
    pub routes: BTreeMap<String, String>,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            shell: ShellSection::default(),
            user: UserSection::default(),
            remotes: default_remotes(),
            routes: default_routes(),
        }
    }
}

fn default_remotes() -> BTreeMap<String, RemoteSection> {
    [
        ("workout", 4001, "./WorkoutApp"),
        ("food", 4002, "./FoodApp"),
        ("analytics", 4003, "./AnalyticsApp"),
    ]
    .into_iter()
    .map(|(name, port, export)| {
        (
            name.to_string(),
            RemoteSection {
                url: format!("http://localhost:{port}/remoteEntry.json"),
                entry_export: export.to_string(),
            },
        )
    })
    .collect()
}

fn default_routes() -> BTreeMap<String, String> {
    ["workout", "food", "analytics"]
        .into_iter()
        .map(|name| (format!("/{name}"), name.to_string()))
        .collect()
}

impl ShellConfig {
    /// Load and validate configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| ConfigError::Io {
            path: path.as_ref().display().to_string(),
            error: e.to_string(),
        })?;

        Self::parse(&content)
    }

    /// Parse and validate configuration from a TOML string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Pick the config file: explicit path, then `PULSE_CONFIG`, then
    /// `pulse.toml` if it exists. `None` means built-in defaults.
    pub fn locate(explicit: Option<PathBuf>) -> Option<PathBuf> {
        explicit
            .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
            .or_else(|| {
                let fallback = PathBuf::from(DEFAULT_CONFIG_FILE);
                fallback.exists().then_some(fallback)
            })
    }

    /// Load from the located file, or fall back to defaults.
    pub fn resolve(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        match Self::locate(explicit) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    /// Check cross-references between sections.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, remote) in &self.remotes {
            if remote.url.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    name: name.clone(),
                    field: "url",
                });
            }
            if remote.entry_export.trim().is_empty() {
                return Err(ConfigError::EmptyField {
                    name: name.clone(),
                    field: "entry_export",
                });
            }
        }

        for (route, remote) in &self.routes {
            if !self.remotes.contains_key(remote) {
                return Err(ConfigError::UnknownRouteTarget {
                    route: route.clone(),
                    remote: remote.clone(),
                });
            }
        }

        if let Some(unknown) = self.shell.preload.iter().find(|n| !self.remotes.contains_key(*n)) {
            return Err(ConfigError::UnknownPreload(unknown.clone()));
        }

        // Prefix syntax and duplicates after normalisation.
        self.route_table()?;
        Ok(())
    }

    /// Remote descriptors handed to the registry.
    pub fn descriptors(&self) -> Vec<RemoteDescriptor> {
        self.remotes
            .iter()
            .map(|(name, remote)| {
                RemoteDescriptor::new(name.as_str(), remote.url.as_str(), remote.entry_export.as_str())
            })
            .collect()
    }

    pub fn route_table(&self) -> Result<RouteTable, ConfigError> {
        Ok(RouteTable::new(
            self.routes.iter().map(|(prefix, remote)| (prefix.as_str(), remote.as_str())),
        )?)
    }

    pub fn host_config(&self) -> HostConfig {
        HostConfig {
            stall_after: Duration::from_millis(self.shell.stall_after_ms),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.shell.fetch_timeout_ms)
    }

    pub fn user_profile(&self) -> UserProfile {
        UserProfile {
            id: self.user.id.clone(),
            display_name: self.user.display_name.clone(),
            email: self.user.email.clone(),
        }
    }
}
