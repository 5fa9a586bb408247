//! Plan import, workout export, and the import schema.

use std::fs;
use std::io::Read;

use chrono::{Local, NaiveDate};

use crate::cli::args::{ExportArgs, ImportArgs};
use crate::error::Result;
use crate::runtime::Runtime;
use crate::ui::UserInterface;
use crate::workout::{export_plan, export_report, plan_schema, WorkoutLog};

use super::dispatcher::{Command, CommandResult};

/// The import command implementation.
pub struct ImportCommand {
    runtime: Runtime,
    args: ImportArgs,
}

impl ImportCommand {
    pub fn new(runtime: &Runtime, args: ImportArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
        }
    }

    fn read_source(&self) -> Result<String> {
        if self.args.source == "-" {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            Ok(text)
        } else {
            Ok(fs::read_to_string(&self.args.source)?)
        }
    }
}

impl Command for ImportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let text = self.read_source()?;
        let log = WorkoutLog::bind(&self.runtime)?;
        let count = log.import_json(&text)?;

        ui.success(&format!(
            "Imported {} exercise{}",
            count,
            if count == 1 { "" } else { "s" }
        ));
        Ok(CommandResult::success())
    }
}

/// The export command implementation.
pub struct ExportCommand {
    runtime: Runtime,
    args: ExportArgs,
    date: NaiveDate,
}

impl ExportCommand {
    /// Export dated today.
    pub fn new(runtime: &Runtime, args: ExportArgs) -> Self {
        Self::with_date(runtime, args, Local::now().date_naive())
    }

    pub fn with_date(runtime: &Runtime, args: ExportArgs, date: NaiveDate) -> Self {
        Self {
            runtime: runtime.clone(),
            args,
            date,
        }
    }
}

impl Command for ExportCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let log = WorkoutLog::bind(&self.runtime)?;
        let exercises = log.exercises();

        let text = if self.args.plan {
            export_plan(&exercises)?
        } else {
            export_report(&exercises, self.date)
        };

        match &self.args.output {
            Some(path) => {
                fs::write(path, format!("{}\n", text))?;
                ui.success(&format!("Exported to {}", path.display()));
            }
            None => ui.emit(&text),
        }

        Ok(CommandResult::success())
    }
}

/// The schema command implementation.
#[derive(Debug, Default)]
pub struct SchemaCommand;

impl SchemaCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let schema = serde_json::to_string_pretty(&plan_schema())
            .map_err(|e| anyhow::anyhow!("Failed to render schema: {}", e))?;
        ui.emit(&schema);
        Ok(CommandResult::success())
    }
}
