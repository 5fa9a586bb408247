//! Workout plan import format.
//!
//! A plan is a JSON array of `{ id, name, defaultLoad, sets, note? }`
//! objects where `sets` is a count. Importing regenerates every set from
//! `defaultLoad`, so recorded reps never travel with a plan.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

use super::exercise::{Exercise, SetEntry};
use crate::error::{LiftlogError, Result};

const REQUIRED_FIELDS: &str = "Each exercise must have id, name, defaultLoad, and sets";

/// One exercise in a plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePlan {
    /// Unique positive id.
    pub id: u32,
    /// Display name.
    pub name: String,
    /// Load every set starts at, in pounds.
    pub default_load: f64,
    /// Number of sets to generate.
    pub sets: u32,
    /// Free-form note.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub note: String,
}

impl ExercisePlan {
    /// Expand the plan into a log entry with blank sets.
    pub fn into_exercise(self) -> Exercise {
        Exercise {
            id: self.id,
            name: self.name,
            default_load: self.default_load,
            sets: (0..self.sets)
                .map(|_| SetEntry::blank(self.default_load))
                .collect(),
            note: self.note,
        }
    }
}

impl From<&Exercise> for ExercisePlan {
    fn from(ex: &Exercise) -> Self {
        Self {
            id: ex.id,
            name: ex.name.clone(),
            default_load: ex.default_load,
            sets: ex.sets.len() as u32,
            note: ex.note.clone(),
        }
    }
}

/// Validate a plan payload.
///
/// The first offending entry rejects the whole payload.
pub fn parse_plan(payload: &Value) -> Result<Vec<ExercisePlan>> {
    let entries = payload.as_array().ok_or_else(|| invalid("Imported data must be an array"))?;

    let mut seen = HashSet::new();
    let mut plans = Vec::with_capacity(entries.len());

    for (index, entry) in entries.iter().enumerate() {
        let position = index + 1;
        let plan = parse_entry(entry)
            .ok_or_else(|| invalid(format!("{} (entry {})", REQUIRED_FIELDS, position)))?;

        if !seen.insert(plan.id) {
            return Err(invalid(format!(
                "Duplicate exercise id {} (entry {})",
                plan.id, position
            )));
        }
        plans.push(plan);
    }

    Ok(plans)
}

/// Parse plan text.
pub fn parse_plan_json(text: &str) -> Result<Vec<ExercisePlan>> {
    let payload: Value = serde_json::from_str(text)
        .map_err(|e| invalid(format!("Invalid JSON format: {}", e)))?;
    parse_plan(&payload)
}

/// JSON Schema for the plan format.
pub fn plan_schema() -> schemars::Schema {
    schemars::schema_for!(Vec<ExercisePlan>)
}

fn parse_entry(entry: &Value) -> Option<ExercisePlan> {
    let object = entry.as_object()?;

    let id = object
        .get("id")?
        .as_u64()
        .filter(|id| *id > 0)
        .and_then(|id| u32::try_from(id).ok())?;
    let name = object.get("name")?.as_str().filter(|name| !name.is_empty())?;
    let default_load = object.get("defaultLoad")?.as_f64()?;
    let sets = object
        .get("sets")?
        .as_u64()
        .and_then(|sets| u32::try_from(sets).ok())?;
    let note = object.get("note").and_then(Value::as_str).unwrap_or_default();

    Some(ExercisePlan {
        id,
        name: name.to_string(),
        default_load,
        sets,
        note: note.to_string(),
    })
}

fn invalid(message: impl Into<String>) -> LiftlogError {
    LiftlogError::InvalidImport {
        message: message.into(),
    }
}
