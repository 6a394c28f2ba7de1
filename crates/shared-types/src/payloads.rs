//! # Topic Payloads
//!
//! Reference payload shapes for every topic in the catalogue.
//!
//! The bus carries payloads as untyped JSON; these structs are the shapes the
//! bundled fragments agree on. Field names are the wire contract, so renaming
//! one is a breaking change for every independently deployed consumer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::app_state::{Theme, UserProfile};

/// Payload of `workout:logged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkoutLogged {
    pub id: Uuid,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    /// Load per rep, if the exercise is weighted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight_kg: Option<f64>,
    pub logged_at: DateTime<Utc>,
}

impl WorkoutLogged {
    /// A new workout entry stamped with the current time.
    #[must_use]
    pub fn new(exercise: impl Into<String>, sets: u32, reps: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            exercise: exercise.into(),
            sets,
            reps,
            weight_kg: None,
            logged_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_weight(mut self, weight_kg: f64) -> Self {
        self.weight_kg = Some(weight_kg);
        self
    }
}

/// Payload of `workout:deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkoutDeleted {
    pub id: Uuid,
}

/// Payload of `meal:logged`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealLogged {
    pub id: Uuid,
    pub name: String,
    pub calories: u32,
    pub logged_at: DateTime<Utc>,
}

impl MealLogged {
    /// A new meal entry stamped with the current time.
    #[must_use]
    pub fn new(name: impl Into<String>, calories: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            calories,
            logged_at: Utc::now(),
        }
    }
}

/// Payload of `meal:deleted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealDeleted {
    pub id: Uuid,
}

/// Payload of `user:updated`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserUpdated {
    pub user: UserProfile,
    #[serde(default)]
    pub logged_in: bool,
    /// State version after the update.
    pub version: u64,
}

/// Payload of `theme:changed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeChanged {
    pub theme: Theme,
    /// State version after the change.
    pub version: u64,
}
