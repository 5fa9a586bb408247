//! Workout log model.
//!
//! The log is a list of [`Exercise`] entries bound to
//! `WorkoutTracker:exercises`. Every mutation validates its target first
//! and then goes through [`PersistedValue::update`] with an updater, so
//! back-to-back edits in one context never lose each other.

pub mod exercise;
pub mod export;
pub mod import;

pub use exercise::{default_exercises, Exercise, SetEntry, SetField};
pub use export::{export_plan, export_report};
pub use import::{parse_plan, parse_plan_json, plan_schema, ExercisePlan};

use serde_json::Value;

use crate::error::{LiftlogError, Result};
use crate::notify::Subscription;
use crate::persisted::{Initial, PersistedValue};
use crate::runtime::Runtime;
use crate::store::PersistedKey;

/// Namespace shared by every key this application persists.
pub const NAMESPACE: &str = "WorkoutTracker";

/// Key holding the exercise log.
pub fn exercises_key() -> PersistedKey {
    PersistedKey::new(NAMESPACE, "exercises")
}

/// The exercise log of one context.
pub struct WorkoutLog {
    exercises: PersistedValue<Vec<Exercise>>,
}

impl WorkoutLog {
    /// Bind the log; an empty store starts from the default template.
    pub fn bind(runtime: &Runtime) -> Result<Self> {
        let exercises =
            PersistedValue::<Vec<Exercise>>::bind(runtime, exercises_key(), Initial::lazy(default_exercises))?;
        Ok(Self { exercises })
    }

    /// A copy of every exercise, in order.
    pub fn exercises(&self) -> Vec<Exercise> {
        self.exercises.get()
    }

    /// A copy of one exercise.
    pub fn exercise(&self, id: u32) -> Option<Exercise> {
        self.exercises.with(|all| all.iter().find(|ex| ex.id == id).cloned())
    }

    /// Call `f` whenever the log changes through a delivered event.
    pub fn watch(&self, f: impl Fn(&[Exercise]) + 'static) -> Subscription {
        self.exercises.watch(move |all: &Vec<Exercise>| f(all))
    }

    /// Change the load or reps of one set.
    pub fn update_set(&self, id: u32, index: usize, field: SetField) -> Result<()> {
        self.check_set(id, index)?;
        self.modify(id, move |ex| {
            if let Some(set) = ex.sets.get_mut(index) {
                field.apply(set);
            }
        })
    }

    /// Replace an exercise's note.
    pub fn update_note(&self, id: u32, note: impl Into<String>) -> Result<()> {
        self.check_exercise(id)?;
        let note = note.into();
        self.modify(id, move |ex| ex.note = note)
    }

    /// Append a blank set at the exercise's default load.
    pub fn add_set(&self, id: u32) -> Result<()> {
        self.check_exercise(id)?;
        self.modify(id, |ex| ex.sets.push(SetEntry::blank(ex.default_load)))
    }

    /// Remove one set. An exercise always keeps at least one set, so
    /// removing the last one is a no-op that returns `false`.
    pub fn remove_set(&self, id: u32, index: usize) -> Result<bool> {
        let len = self.check_set(id, index)?;
        if len <= 1 {
            tracing::debug!("Exercise {} keeps its last set", id);
            return Ok(false);
        }

        self.modify(id, move |ex| {
            if ex.sets.len() > 1 && index < ex.sets.len() {
                ex.sets.remove(index);
            }
        })?;
        Ok(true)
    }

    /// Replace the log with the default template.
    pub fn reset(&self) -> Result<()> {
        self.exercises.update(|_| default_exercises())
    }

    /// Replace the log with a validated plan. Returns the number imported.
    ///
    /// A rejected payload leaves the log untouched.
    pub fn import(&self, payload: &Value) -> Result<usize> {
        let plans = parse_plan(payload)?;
        self.replace_with(plans)
    }

    /// Parse and import plan text.
    pub fn import_json(&self, text: &str) -> Result<usize> {
        let plans = parse_plan_json(text)?;
        self.replace_with(plans)
    }

    fn replace_with(&self, plans: Vec<ExercisePlan>) -> Result<usize> {
        let count = plans.len();
        self.exercises
            .update(move |_| plans.into_iter().map(ExercisePlan::into_exercise).collect())?;
        tracing::info!("Imported {} exercises", count);
        Ok(count)
    }

    fn modify(&self, id: u32, f: impl FnOnce(&mut Exercise)) -> Result<()> {
        self.exercises.update(move |prev| {
            let mut next = prev.clone();
            if let Some(ex) = next.iter_mut().find(|ex| ex.id == id) {
                f(ex);
            }
            next
        })
    }

    /// Returns the exercise's set count.
    fn check_exercise(&self, id: u32) -> Result<usize> {
        self.exercises
            .with(|all| all.iter().find(|ex| ex.id == id).map(|ex| ex.sets.len()))
            .ok_or(LiftlogError::UnknownExercise { id })
    }

    fn check_set(&self, id: u32, index: usize) -> Result<usize> {
        let len = self.check_exercise(id)?;
        if index >= len {
            return Err(LiftlogError::SetOutOfRange { id, index, len });
        }
        Ok(len)
    }
}
