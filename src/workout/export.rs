//! Plain-text workout report and plan export.

use chrono::NaiveDate;

use super::exercise::Exercise;
use super::import::ExercisePlan;
use crate::error::Result;

/// Render the shareable report: the date, then one line per exercise.
pub fn export_report(exercises: &[Exercise], date: NaiveDate) -> String {
    let mut lines = Vec::with_capacity(exercises.len() + 1);
    lines.push(date.format("%-m/%-d/%Y").to_string());

    for ex in exercises {
        let sets = ex
            .sets
            .iter()
            .map(|set| {
                let reps = if set.reps.is_empty() { "?" } else { set.reps.as_str() };
                format!("{}lb x{}", set.load, reps)
            })
            .collect::<Vec<_>>()
            .join(", ");

        if ex.note.is_empty() {
            lines.push(format!("{}: {}", ex.name, sets));
        } else {
            lines.push(format!("{}: {} ({})", ex.name, sets, ex.note));
        }
    }

    lines.join("\n")
}

/// Write the log back out in the import format.
pub fn export_plan(exercises: &[Exercise]) -> Result<String> {
    let plans: Vec<ExercisePlan> = exercises.iter().map(ExercisePlan::from).collect();
    serde_json::to_string_pretty(&plans).map_err(|e| anyhow::anyhow!(e).into())
}
