//! Food fragment: logs and deletes meals.

use parking_lot::Mutex;
use pf_01_remote_registry::{FragmentContext, FragmentInstance, RemoteModule};
use shared_bus::{EventPublisher, Topic};
use shared_types::{FragmentName, MealDeleted, MealLogged, MountError};
use std::sync::Arc;
use tracing::warn;

use super::{position, segments, theme_badge};

pub const FOOD_EXPORT: &str = "./FoodApp";

/// The food remote's root export.
pub struct FoodModule {
    name: FragmentName,
    meals: Arc<Mutex<Vec<MealLogged>>>,
}

impl FoodModule {
    pub fn new() -> Self {
        Self {
            name: FragmentName::from("food"),
            meals: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for FoodModule {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteModule for FoodModule {
    fn name(&self) -> &FragmentName {
        &self.name
    }

    fn entry_export(&self) -> &str {
        FOOD_EXPORT
    }

    fn mount(&self, context: FragmentContext) -> Result<Box<dyn FragmentInstance>, MountError> {
        Ok(Box::new(FoodView {
            context,
            meals: self.meals.clone(),
            notice: None,
        }))
    }
}

struct FoodView {
    context: FragmentContext,
    meals: Arc<Mutex<Vec<MealLogged>>>,
    notice: Option<String>,
}

impl FoodView {
    fn log_meal(&mut self, name: &str, calories: &str) {
        let Ok(calories) = calories.parse::<u32>() else {
            self.notice = Some(format!("Not a calorie count: {calories}"));
            return;
        };

        let meal = MealLogged::new(name, calories);
        self.meals.lock().push(meal.clone());
        self.notice = Some(format!("Logged {name} ({calories} kcal)"));
        if let Err(e) = self.context.bus.publish_typed(Topic::MealLogged, &meal) {
            warn!(error = %e, "Could not publish logged meal");
        }
    }

    fn delete_meal(&mut self, raw: &str) {
        let removed = {
            let mut meals = self.meals.lock();
            position(raw, meals.len()).map(|index| meals.remove(index))
        };

        match removed {
            Some(meal) => {
                self.notice = Some(format!("Deleted {}", meal.name));
                if let Err(e) = self
                    .context
                    .bus
                    .publish_typed(Topic::MealDeleted, &MealDeleted { id: meal.id })
                {
                    warn!(error = %e, "Could not publish deleted meal");
                }
            }
            None => self.notice = Some(format!("No meal #{raw}")),
        }
    }
}

impl FragmentInstance for FoodView {
    fn render(&self) -> String {
        let meals = self.meals.lock();
        let calories: u32 = meals.iter().map(|m| m.calories).sum();
        let mut view = format!(
            "{} Food Log: {} meals, {calories} kcal",
            theme_badge(self.context.state.as_ref()),
            meals.len()
        );
        if let Some(notice) = &self.notice {
            view.push_str(&format!(" | {notice}"));
        }
        view
    }

    fn navigate(&mut self, sub_path: &str) {
        match segments(sub_path).as_slice() {
            [] => self.notice = None,
            [command, name, calories] if command == "new" => self.log_meal(name, calories),
            [command, index] if command == "delete" => self.delete_meal(index),
            _ => self.notice = Some(format!("Unknown page {sub_path}")),
        }
    }
}
