//! Workout log edit commands.
//!
//! `set`, `note`, `add-set`, `remove-set`, and `reset` each bind the log,
//! apply one mutation, and echo the result.

use crate::cli::args::{AddSetArgs, NoteArgs, RemoveSetArgs, ResetArgs, SetArgs};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::ui::{Prompt, UserInterface};
use crate::workout::{SetField, WorkoutLog};

use super::dispatcher::{Command, CommandResult};
use super::display;

/// Convert a 1-based set number, reporting 0 to the user.
fn set_index(ui: &mut dyn UserInterface, set: usize) -> Option<usize> {
    let index = set.checked_sub(1);
    if index.is_none() {
        ui.error("Set numbers start at 1");
    }
    index
}

fn echo_exercise(ui: &mut dyn UserInterface, log: &WorkoutLog, id: u32) {
    if let Some(ex) = log.exercise(id) {
        ui.emit(&display::render_exercise(&ex, &display::theme()));
    }
}

/// The set command implementation.
pub struct SetCommand {
    runtime: Runtime,
    args: SetArgs,
}

impl SetCommand {
    pub fn new(runtime: &Runtime, args: SetArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
        }
    }
}

impl Command for SetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(index) = set_index(ui, self.args.set) else {
            return Ok(CommandResult::failure(2));
        };

        if self.args.load.is_none() && self.args.reps.is_none() {
            ui.warning("Nothing to record; pass --load and/or --reps");
            return Ok(CommandResult::failure(2));
        }

        let log = WorkoutLog::bind(&self.runtime)?;
        if let Some(load) = self.args.load {
            log.update_set(self.args.id, index, SetField::Load(load))?;
        }
        if let Some(reps) = &self.args.reps {
            log.update_set(self.args.id, index, SetField::Reps(reps.clone()))?;
        }

        echo_exercise(ui, &log, self.args.id);
        Ok(CommandResult::success())
    }
}

/// The note command implementation.
pub struct NoteCommand {
    runtime: Runtime,
    args: NoteArgs,
}

impl NoteCommand {
    pub fn new(runtime: &Runtime, args: NoteArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
        }
    }
}

impl Command for NoteCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let log = WorkoutLog::bind(&self.runtime)?;
        log.update_note(self.args.id, self.args.text.as_str())?;

        if self.args.text.is_empty() {
            ui.success("Note cleared");
        } else {
            ui.success("Note saved");
        }
        Ok(CommandResult::success())
    }
}

/// The add-set command implementation.
pub struct AddSetCommand {
    runtime: Runtime,
    args: AddSetArgs,
}

impl AddSetCommand {
    pub fn new(runtime: &Runtime, args: AddSetArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
        }
    }
}

impl Command for AddSetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let log = WorkoutLog::bind(&self.runtime)?;
        log.add_set(self.args.id)?;
        echo_exercise(ui, &log, self.args.id);
        Ok(CommandResult::success())
    }
}

/// The remove-set command implementation.
pub struct RemoveSetCommand {
    runtime: Runtime,
    args: RemoveSetArgs,
}

impl RemoveSetCommand {
    pub fn new(runtime: &Runtime, args: RemoveSetArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
        }
    }
}

impl Command for RemoveSetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(index) = set_index(ui, self.args.set) else {
            return Ok(CommandResult::failure(2));
        };

        let log = WorkoutLog::bind(&self.runtime)?;
        if !log.remove_set(self.args.id, index)? {
            ui.warning("An exercise keeps at least one set");
        }

        echo_exercise(ui, &log, self.args.id);
        Ok(CommandResult::success())
    }
}

/// The reset command implementation.
pub struct ResetCommand {
    runtime: Runtime,
    args: ResetArgs,
}

impl ResetCommand {
    pub fn new(runtime: &Runtime, args: ResetArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
        }
    }
}

impl Command for ResetCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !self.args.force {
            let prompt = Prompt::confirm(
                "reset",
                "Reset the workout? Recorded reps and notes will be lost",
                false,
            );
            if ui.prompt(&prompt)?.as_bool() != Some(true) {
                ui.message("Reset cancelled");
                return Ok(CommandResult::failure(1));
            }
        }

        let log = WorkoutLog::bind(&self.runtime)?;
        log.reset()?;
        ui.success("Workout reset to the default template");
        Ok(CommandResult::success())
    }
}
