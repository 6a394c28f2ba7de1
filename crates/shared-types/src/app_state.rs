//! # Shared Application State
//!
//! The small set of globally relevant values every fragment may read:
//! the session, the current user and display preferences.
//!
//! ## Ownership
//!
//! The host owns the only mutable copy. Fragments see immutable snapshots
//! and change state exclusively by dispatching a `StateAction`. Every
//! effective change bumps `version`; an action that changes nothing does not.

use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Display theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// The other theme.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }
}

/// Unit system for weights and distances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

/// Identity of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfile {
    #[must_use]
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            email: None,
        }
    }
}

/// Session status.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AuthState {
    pub is_logged_in: bool,
    /// Cleared on logout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Display preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: Theme,
    pub units: Units,
}

/// Versioned snapshot of the shared application state.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppState {
    /// Incremented on every effective change.
    pub version: u64,
    #[serde(default)]
    pub auth: AuthState,
    pub user: UserProfile,
    pub preferences: Preferences,
}

/// The narrow, named mutations fragments may request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StateAction {
    ToggleTheme,
    SetTheme(Theme),
    SetUnits(Units),
    UpdateUser(UserProfile),
    Login { token: String },
    Logout,
}

/// What an applied action actually changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateChange {
    /// The action was a no-op; the version is unchanged.
    Unchanged,
    Theme(Theme),
    Units(Units),
    User,
    /// The session was opened or closed.
    Auth { logged_in: bool },
}

impl AppState {
    /// Initial state for `user`, before any login.
    #[must_use]
    pub fn for_user(user: UserProfile) -> Self {
        Self {
            version: 0,
            auth: AuthState::default(),
            user,
            preferences: Preferences::default(),
        }
    }

    /// Apply an action, bumping the version when something changed.
    pub fn apply(&mut self, action: StateAction) -> StateChange {
        let change = match action {
            StateAction::ToggleTheme => {
                self.preferences.theme = self.preferences.theme.toggled();
                StateChange::Theme(self.preferences.theme)
            }
            StateAction::SetTheme(theme) if theme == self.preferences.theme => {
                StateChange::Unchanged
            }
            StateAction::SetTheme(theme) => {
                self.preferences.theme = theme;
                StateChange::Theme(theme)
            }
            StateAction::SetUnits(units) if units == self.preferences.units => {
                StateChange::Unchanged
            }
            StateAction::SetUnits(units) => {
                self.preferences.units = units;
                StateChange::Units(units)
            }
            StateAction::UpdateUser(user) if user == self.user => StateChange::Unchanged,
            StateAction::UpdateUser(user) => {
                self.user = user;
                StateChange::User
            }
            StateAction::Login { token }
                if self.auth.is_logged_in && self.auth.token.as_ref() == Some(&token) =>
            {
                StateChange::Unchanged
            }
            StateAction::Login { token } => {
                self.auth = AuthState {
                    is_logged_in: true,
                    token: Some(token),
                };
                StateChange::Auth { logged_in: true }
            }
            StateAction::Logout if self.auth == AuthState::default() => StateChange::Unchanged,
            StateAction::Logout => {
                self.auth = AuthState::default();
                StateChange::Auth { logged_in: false }
            }
        };

        if change != StateChange::Unchanged {
            self.version += 1;
        }
        change
    }
}

/// Read access plus the narrow mutation path, as handed to fragments.
///
/// Implemented by the host's state store. Fragments never receive a mutable
/// reference to the state itself.
pub trait StateAccess: Send + Sync {
    /// Current immutable snapshot.
    fn snapshot(&self) -> Arc<AppState>;

    /// Request a named mutation.
    fn dispatch(&self, action: StateAction) -> StateChange;
}
