//! Exercise entries and the default template.

use serde::{Deserialize, Serialize};

/// One logged set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetEntry {
    pub load: f64,
    pub reps: String,
}

impl SetEntry {
    /// A set at `load` with no reps recorded yet.
    pub fn blank(load: f64) -> Self {
        Self {
            load,
            reps: String::new(),
        }
    }
}

/// One exercise in the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: u32,
    pub name: String,
    pub default_load: f64,
    pub sets: Vec<SetEntry>,
    #[serde(default)]
    pub note: String,
}

impl Exercise {
    /// An exercise with `set_count` blank sets at `default_load`.
    pub fn new(id: u32, name: impl Into<String>, default_load: f64, set_count: u32) -> Self {
        Self {
            id,
            name: name.into(),
            default_load,
            sets: (0..set_count).map(|_| SetEntry::blank(default_load)).collect(),
            note: String::new(),
        }
    }

    pub fn set(&self, index: usize) -> Option<&SetEntry> {
        self.sets.get(index)
    }
}

/// Which field of a set to change.
#[derive(Debug, Clone, PartialEq)]
pub enum SetField {
    Load(f64),
    Reps(String),
}

impl SetField {
    pub(crate) fn apply(self, set: &mut SetEntry) {
        match self {
            Self::Load(load) => set.load = load,
            Self::Reps(reps) => set.reps = reps,
        }
    }
}

/// The template a fresh or reset log starts from.
pub fn default_exercises() -> Vec<Exercise> {
    vec![
        Exercise::new(1, "Double‑DB Front Squat", 40.0, 3),
        Exercise::new(2, "Dumbbell Bench Press", 40.0, 3),
        Exercise::new(3, "Seated Overhead Press", 20.0, 4),
    ]
}
