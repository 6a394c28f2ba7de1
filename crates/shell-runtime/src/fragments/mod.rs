//! # Bundled Fragments
//!
//! The three FitLog fragments linked into the shell binary. Each is a
//! `RemoteModule` keyed by its exposed export, and renders a one-line text
//! summary as its UI.
//!
//! Sub-paths double as commands in the headless shell:
//!
//! | Fragment | Sub-path | Effect |
//! |----------|----------|--------|
//! | workout | `/new/<exercise>/<sets>/<reps>[/<kg>]` | log a workout, publish `workout:logged` |
//! | workout | `/delete/<n>` | delete the n-th workout, publish `workout:deleted` |
//! | food | `/new/<meal>/<calories>` | log a meal, publish `meal:logged` |
//! | food | `/delete/<n>` | delete the n-th meal, publish `meal:deleted` |
//! | analytics | `/` | show running totals |

pub mod analytics;
pub mod food;
pub mod workout;

pub use analytics::{AnalyticsModule, Totals, ANALYTICS_EXPORT};
pub use food::{FoodModule, FOOD_EXPORT};
pub use workout::{WorkoutModule, WORKOUT_EXPORT};

use pf_01_remote_registry::ModuleCatalog;
use shared_types::{StateAccess, Theme};
use std::sync::Arc;

/// Catalogue of every bundled fragment.
pub fn catalog() -> ModuleCatalog {
    ModuleCatalog::new()
        .with(Arc::new(WorkoutModule::new()))
        .with(Arc::new(FoodModule::new()))
        .with(Arc::new(AnalyticsModule::new()))
}

/// Non-empty path segments, percent-decoded spaces included.
fn segments(sub_path: &str) -> Vec<String> {
    sub_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.replace("%20", " ").replace('+', " "))
        .collect()
}

/// Parse a 1-based list position.
fn position(raw: &str, len: usize) -> Option<usize> {
    raw.parse::<usize>()
        .ok()
        .filter(|n| (1..=len).contains(n))
        .map(|n| n - 1)
}

/// `[dark] ` style prefix from the current snapshot.
fn theme_badge(state: &dyn StateAccess) -> &'static str {
    match state.snapshot().preferences.theme {
        Theme::Light => "[light]",
        Theme::Dark => "[dark]",
    }
}
