//! Analytics fragment: running totals over workout and meal events.
//!
//! Declares background listening, so its totals keep counting while the
//! user is on another route.

use parking_lot::Mutex;
use pf_01_remote_registry::{FragmentContext, FragmentInstance, RemoteModule};
use serde::Serialize;
use shared_bus::Topic;
use shared_types::{
    FragmentName, ListenPolicy, MealDeleted, MealLogged, MountError, WorkoutDeleted,
    WorkoutLogged,
};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

use super::theme_badge;

pub const ANALYTICS_EXPORT: &str = "./AnalyticsApp";

/// Session totals. Sums that exceed `u32::MAX` are reported as `u32::MAX`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub workouts: u32,
    pub sets: u32,
    pub meals: u32,
    pub calories: u32,
}

/// Logged entries by id, with exact running sums.
#[derive(Debug, Default)]
struct Ledger {
    workout_sets: HashMap<Uuid, u32>,
    meal_calories: HashMap<Uuid, u32>,
    sets: u64,
    calories: u64,
}

fn clamp(value: impl TryInto<u32>) -> u32 {
    value.try_into().unwrap_or(u32::MAX)
}

impl Ledger {
    fn totals(&self) -> Totals {
        Totals {
            workouts: clamp(self.workout_sets.len()),
            sets: clamp(self.sets),
            meals: clamp(self.meal_calories.len()),
            calories: clamp(self.calories),
        }
    }

    fn workout_logged(&mut self, workout: &WorkoutLogged) {
        if self.workout_sets.insert(workout.id, workout.sets).is_none() {
            self.sets = self.sets.saturating_add(u64::from(workout.sets));
        }
    }

    fn workout_deleted(&mut self, deleted: &WorkoutDeleted) {
        if let Some(sets) = self.workout_sets.remove(&deleted.id) {
            self.sets = self.sets.saturating_sub(u64::from(sets));
        }
    }

    fn meal_logged(&mut self, meal: &MealLogged) {
        if self.meal_calories.insert(meal.id, meal.calories).is_none() {
            self.calories = self.calories.saturating_add(u64::from(meal.calories));
        }
    }

    fn meal_deleted(&mut self, deleted: &MealDeleted) {
        if let Some(calories) = self.meal_calories.remove(&deleted.id) {
            self.calories = self.calories.saturating_sub(u64::from(calories));
        }
    }
}

/// The analytics remote's root export.
pub struct AnalyticsModule {
    name: FragmentName,
    ledger: Arc<Mutex<Ledger>>,
}

impl AnalyticsModule {
    pub fn new() -> Self {
        Self {
            name: FragmentName::from("analytics"),
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }

    /// Current totals.
    pub fn totals(&self) -> Totals {
        self.ledger.lock().totals()
    }
}

impl Default for AnalyticsModule {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteModule for AnalyticsModule {
    fn name(&self) -> &FragmentName {
        &self.name
    }

    fn entry_export(&self) -> &str {
        ANALYTICS_EXPORT
    }

    fn listen_policy(&self) -> ListenPolicy {
        ListenPolicy::Background
    }

    fn mount(&self, context: FragmentContext) -> Result<Box<dyn FragmentInstance>, MountError> {
        let ledger = self.ledger.clone();
        context
            .bus
            .subscribe_typed(Topic::WorkoutLogged, move |w: WorkoutLogged| {
                ledger.lock().workout_logged(&w);
                Ok(())
            });

        let ledger = self.ledger.clone();
        context
            .bus
            .subscribe_typed(Topic::WorkoutDeleted, move |d: WorkoutDeleted| {
                ledger.lock().workout_deleted(&d);
                Ok(())
            });

        let ledger = self.ledger.clone();
        context
            .bus
            .subscribe_typed(Topic::MealLogged, move |m: MealLogged| {
                ledger.lock().meal_logged(&m);
                Ok(())
            });

        let ledger = self.ledger.clone();
        context
            .bus
            .subscribe_typed(Topic::MealDeleted, move |d: MealDeleted| {
                ledger.lock().meal_deleted(&d);
                Ok(())
            });

        Ok(Box::new(AnalyticsView {
            context,
            ledger: self.ledger.clone(),
        }))
    }
}

struct AnalyticsView {
    context: FragmentContext,
    ledger: Arc<Mutex<Ledger>>,
}

impl FragmentInstance for AnalyticsView {
    fn render(&self) -> String {
        let totals = self.ledger.lock().totals();
        format!(
            "{} Analytics Dashboard: {} workouts ({} sets), {} meals ({} kcal) this session",
            theme_badge(self.context.state.as_ref()),
            totals.workouts,
            totals.sets,
            totals.meals,
            totals.calories
        )
    }
}
