//! Workout fragment: logs and deletes workouts.

use parking_lot::Mutex;
use pf_01_remote_registry::{FragmentContext, FragmentInstance, RemoteModule};
use shared_bus::{EventPublisher, Topic};
use shared_types::{FragmentName, MountError, WorkoutDeleted, WorkoutLogged};
use std::sync::Arc;
use tracing::{debug, warn};

use super::{position, segments, theme_badge};

pub const WORKOUT_EXPORT: &str = "./WorkoutApp";

/// The workout remote's root export.
///
/// The workout list lives in the module, so it survives re-mounts.
pub struct WorkoutModule {
    name: FragmentName,
    log: Arc<Mutex<Vec<WorkoutLogged>>>,
}

impl WorkoutModule {
    pub fn new() -> Self {
        Self {
            name: FragmentName::from("workout"),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

impl Default for WorkoutModule {
    fn default() -> Self {
        Self::new()
    }
}

impl RemoteModule for WorkoutModule {
    fn name(&self) -> &FragmentName {
        &self.name
    }

    fn entry_export(&self) -> &str {
        WORKOUT_EXPORT
    }

    fn mount(&self, context: FragmentContext) -> Result<Box<dyn FragmentInstance>, MountError> {
        Ok(Box::new(WorkoutView {
            context,
            log: self.log.clone(),
            notice: None,
        }))
    }
}

struct WorkoutView {
    context: FragmentContext,
    log: Arc<Mutex<Vec<WorkoutLogged>>>,
    notice: Option<String>,
}

impl WorkoutView {
    fn log_workout(&mut self, args: &[String]) {
        let parsed = match args {
            [exercise, sets, reps] => sets
                .parse()
                .ok()
                .zip(reps.parse().ok())
                .map(|(sets, reps)| WorkoutLogged::new(exercise.as_str(), sets, reps)),
            [exercise, sets, reps, weight] => sets
                .parse()
                .ok()
                .zip(reps.parse().ok())
                .zip(weight.parse().ok())
                .map(|((sets, reps), kg)| {
                    WorkoutLogged::new(exercise.as_str(), sets, reps).with_weight(kg)
                }),
            _ => None,
        };

        let Some(workout) = parsed else {
            self.notice = Some("usage: new/<exercise>/<sets>/<reps>[/<kg>]".into());
            return;
        };

        self.log.lock().push(workout.clone());
        self.notice = Some(format!(
            "Logged {} {}x{}",
            workout.exercise, workout.sets, workout.reps
        ));
        if let Err(e) = self.context.bus.publish_typed(Topic::WorkoutLogged, &workout) {
            warn!(error = %e, "Could not publish logged workout");
        }
    }

    fn delete_workout(&mut self, raw: &str) {
        let removed = {
            let mut log = self.log.lock();
            position(raw, log.len()).map(|index| log.remove(index))
        };

        let Some(workout) = removed else {
            self.notice = Some(format!("No workout #{raw}"));
            return;
        };

        self.notice = Some(format!("Deleted {}", workout.exercise));
        let deleted = WorkoutDeleted { id: workout.id };
        if let Err(e) = self.context.bus.publish_typed(Topic::WorkoutDeleted, &deleted) {
            warn!(error = %e, "Could not publish deleted workout");
        }
    }
}

impl FragmentInstance for WorkoutView {
    fn render(&self) -> String {
        let log = self.log.lock();
        let entries: Vec<String> = log
            .iter()
            .map(|w| match w.weight_kg {
                Some(kg) => format!("{} {}x{} @{kg}kg", w.exercise, w.sets, w.reps),
                None => format!("{} {}x{}", w.exercise, w.sets, w.reps),
            })
            .collect();

        let mut view = format!(
            "{} My Workouts: {} logged",
            theme_badge(self.context.state.as_ref()),
            entries.len()
        );
        if !entries.is_empty() {
            view.push_str(&format!(" ({})", entries.join(", ")));
        }
        if let Some(notice) = &self.notice {
            view.push_str(&format!(" | {notice}"));
        }
        view
    }

    fn navigate(&mut self, sub_path: &str) {
        debug!(sub_path, "Workout navigation");
        let segments = segments(sub_path);
        match segments.split_first() {
            None => self.notice = None,
            Some((command, args)) if command == "new" => self.log_workout(args),
            Some((command, [index])) if command == "delete" => self.delete_workout(index),
            Some(_) => self.notice = Some(format!("Unknown page {sub_path}")),
        }
    }
}
