//! # Topic Catalogue
//!
//! The closed set of event topics shared by the host and every fragment.
//!
//! ## Compatibility Rules
//!
//! Fragments are built and deployed independently, so the catalogue is
//! additive-only: a topic's wire name is never renamed or reused, and new
//! topics bump `CATALOGUE_VERSION` and record it in `since`.
//!
//! | Topic | Wire name | Since |
//! |-------|-----------|-------|
//! | `WorkoutLogged` | `workout:logged` | 1 |
//! | `WorkoutDeleted` | `workout:deleted` | 1 |
//! | `MealLogged` | `meal:logged` | 1 |
//! | `MealDeleted` | `meal:deleted` | 1 |
//! | `UserUpdated` | `user:updated` | 1 |
//! | `ThemeChanged` | `theme:changed` | 1 |

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::contract::PayloadContract;

/// Current version of the topic catalogue.
pub const CATALOGUE_VERSION: u16 = 1;

/// Payload carried by the bus. Structurally typed; the bus never inspects it.
pub type Payload = serde_json::Value;

/// All topics that can be published on the event bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    // =========================================================================
    // WORKOUT FRAGMENT
    // =========================================================================
    /// A workout was logged.
    WorkoutLogged,
    /// A logged workout was deleted.
    WorkoutDeleted,

    // =========================================================================
    // FOOD FRAGMENT
    // =========================================================================
    /// A meal was logged.
    MealLogged,
    /// A logged meal was deleted.
    MealDeleted,

    // =========================================================================
    // HOST (shared application state)
    // =========================================================================
    /// The signed-in user's profile changed.
    UserUpdated,
    /// The display theme changed.
    ThemeChanged,
}

impl Topic {
    /// Every topic in the catalogue, in declaration order.
    pub const ALL: [Topic; 6] = [
        Topic::WorkoutLogged,
        Topic::WorkoutDeleted,
        Topic::MealLogged,
        Topic::MealDeleted,
        Topic::UserUpdated,
        Topic::ThemeChanged,
    ];

    /// The wire name of this topic.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::WorkoutLogged => "workout:logged",
            Self::WorkoutDeleted => "workout:deleted",
            Self::MealLogged => "meal:logged",
            Self::MealDeleted => "meal:deleted",
            Self::UserUpdated => "user:updated",
            Self::ThemeChanged => "theme:changed",
        }
    }

    /// Catalogue version that introduced this topic.
    #[must_use]
    pub fn since(self) -> u16 {
        match self {
            Self::WorkoutLogged
            | Self::WorkoutDeleted
            | Self::MealLogged
            | Self::MealDeleted
            | Self::UserUpdated
            | Self::ThemeChanged => 1,
        }
    }

    /// The payload contract producers and consumers of this topic agree on.
    #[must_use]
    pub fn contract(self) -> PayloadContract {
        match self {
            Self::WorkoutLogged => {
                PayloadContract::new(1, &["id", "exercise", "sets", "reps", "logged_at"])
            }
            Self::WorkoutDeleted | Self::MealDeleted => PayloadContract::new(1, &["id"]),
            Self::MealLogged => PayloadContract::new(1, &["id", "name", "calories", "logged_at"]),
            Self::UserUpdated => PayloadContract::new(1, &["user", "version"]),
            Self::ThemeChanged => PayloadContract::new(1, &["theme", "version"]),
        }
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A wire name that is not in the catalogue.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown topic: {0}")]
pub struct UnknownTopic(pub String);

impl FromStr for Topic {
    type Err = UnknownTopic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str() == s)
            .ok_or_else(|| UnknownTopic(s.to_string()))
    }
}

impl Serialize for Topic {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Topic {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        name.parse().map_err(serde::de::Error::custom)
    }
}

/// An event as it exists during a single delivery pass.
///
/// Created at publish time and never queued or persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub topic: Topic,
    pub payload: Payload,
}

impl EventEnvelope {
    #[must_use]
    pub fn new(topic: Topic, payload: Payload) -> Self {
        Self { topic, payload }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_names_are_stable() {
        // Renaming any of these breaks independently deployed fragments.
        let names: Vec<_> = Topic::ALL.iter().map(|t| t.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "workout:logged",
                "workout:deleted",
                "meal:logged",
                "meal:deleted",
                "user:updated",
                "theme:changed",
            ]
        );
    }

    #[test]
    fn test_parse_round_trips_every_topic() {
        for topic in Topic::ALL {
            assert_eq!(topic.as_str().parse::<Topic>(), Ok(topic));
        }
    }

    #[test]
    fn test_parse_rejects_literal_typos() {
        let err = "workout:loged".parse::<Topic>().unwrap_err();
        assert_eq!(err, UnknownTopic("workout:loged".to_string()));
    }

    #[test]
    fn test_no_topic_newer_than_catalogue() {
        assert!(Topic::ALL.iter().all(|t| t.since() <= CATALOGUE_VERSION));
    }

    #[test]
    fn test_envelope_serializes_wire_name() {
        let envelope = EventEnvelope::new(Topic::ThemeChanged, serde_json::json!({"theme": "dark"}));
        let value = serde_json::to_value(&envelope).unwrap();
        assert_eq!(value["topic"], "theme:changed");

        let back: EventEnvelope = serde_json::from_value(value).unwrap();
        assert_eq!(back.topic, Topic::ThemeChanged);
    }
}
