//! Show command implementation.
//!
//! The `liftlog show` command prints every exercise with its sets and the
//! rest timer footer.

use crate::cli::args::ShowArgs;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::timer::{RestTimer, SilentAlarm};
use crate::ui::UserInterface;
use crate::workout::WorkoutLog;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// The show command implementation.
pub struct ShowCommand {
    runtime: Runtime,
    args: ShowArgs,
}

impl ShowCommand {
    /// Create a new show command.
    pub fn new(runtime: &Runtime, args: ShowArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
        }
    }
}

impl Command for ShowCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let log = WorkoutLog::bind(&self.runtime)?;

        if self.args.json {
            let json = serde_json::to_string_pretty(&log.exercises())
                .map_err(|e| anyhow::anyhow!("Failed to serialize workout: {}", e))?;
            ui.emit(&json);
            return Ok(CommandResult::success());
        }

        let timer = RestTimer::bind(&self.runtime, SilentAlarm)?;
        let theme = display::theme();

        ui.emit(&display::render_workout(&log.exercises(), &theme));
        ui.emit("");
        ui.emit(&display::render_rest(timer.state(), &theme));

        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use crate::workout::Exercise;

    #[test]
    fn shows_default_template_and_idle_timer() {
        let runtime = Runtime::in_memory();
        let mut ui = MockUI::new();

        let result = ShowCommand::new(&runtime, ShowArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        let out = ui.output();
        assert!(out.contains("1. Double‑DB Front Squat"));
        assert!(out.contains("3. Seated Overhead Press"));
        assert!(out.contains("Start rest"));
    }

    #[test]
    fn shows_running_rest() {
        let runtime = Runtime::in_memory();
        RestTimer::bind(&runtime, SilentAlarm).unwrap().start(90).unwrap();
        let mut ui = MockUI::new();

        ShowCommand::new(&runtime, ShowArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(ui.output().contains("Rest: 9"));
    }

    #[test]
    fn json_output_parses_back() {
        let runtime = Runtime::in_memory();
        let mut ui = MockUI::new();

        ShowCommand::new(&runtime, ShowArgs { json: true })
            .execute(&mut ui)
            .unwrap();

        let parsed: Vec<Exercise> = serde_json::from_str(&ui.output()).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed[2].sets.len(), 4);
    }

    #[test]
    fn show_does_not_write_the_template() {
        let runtime = Runtime::in_memory();
        let mut ui = MockUI::new();

        ShowCommand::new(&runtime, ShowArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert_eq!(runtime.read(&crate::workout::exercises_key()).unwrap(), None);
    }
}
