//! Shared display helpers for the workout and the rest timer.
//!
//! Used by `show`, `watch`, and the commands that echo the exercise they
//! just changed.

use crate::timer::TimerState;
use crate::ui::{should_use_colors, LiftlogTheme, Table};
use crate::workout::Exercise;

/// Theme for command output, plain when colors are off.
pub fn theme() -> LiftlogTheme {
    if should_use_colors() {
        LiftlogTheme::new()
    } else {
        LiftlogTheme::plain()
    }
}

/// Format a load without a trailing `.0`.
pub fn format_load(load: f64) -> String {
    format!("{}lb", load)
}

/// Reps as recorded, `?` when nothing was entered yet.
pub fn format_reps(reps: &str) -> &str {
    if reps.is_empty() {
        "?"
    } else {
        reps
    }
}

/// Render one exercise: a title line, its sets table, and the note.
pub fn render_exercise(exercise: &Exercise, theme: &LiftlogTheme) -> String {
    let mut table = Table::new(&["Set", "Load", "Reps"]);
    for (i, set) in exercise.sets.iter().enumerate() {
        let reps = if set.reps.is_empty() {
            theme.pending.apply_to("?").to_string()
        } else {
            set.reps.clone()
        };
        table.add_row(&[(i + 1).to_string(), format_load(set.load), reps]);
    }

    let mut out = format!(
        "{} {}",
        theme.dim.apply_to(format!("{}.", exercise.id)),
        theme.exercise.apply_to(&exercise.name)
    );
    out.push('\n');
    out.push_str(&table.render());
    if !exercise.note.is_empty() {
        out.push('\n');
        out.push_str(&theme.note.apply_to(format!("Note: {}", exercise.note)).to_string());
    }
    out
}

/// Render the whole workout, exercises separated by blank lines.
pub fn render_workout(exercises: &[Exercise], theme: &LiftlogTheme) -> String {
    if exercises.is_empty() {
        return theme.dim.apply_to("No exercises. Import a plan to begin.").to_string();
    }

    exercises
        .iter()
        .map(|ex| render_exercise(ex, theme))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// The rest footer for a timer state.
pub fn render_rest(state: TimerState, theme: &LiftlogTheme) -> String {
    match state {
        TimerState::Running { remaining_secs } => theme.format_rest(Some(remaining_secs)),
        TimerState::Idle => theme.format_rest(None),
    }
}
