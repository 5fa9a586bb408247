//! Store diagnostics.
//!
//! `liftlog store list` shows which keys the data directory holds.

use std::path::PathBuf;

use crate::cli::args::{StoreAction, StoreArgs};
use crate::error::Result;
use crate::store::{FileStore, KeyValueStore};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// The store command implementation.
pub struct StoreCommand {
    data_dir: PathBuf,
    args: StoreArgs,
}

impl StoreCommand {
    pub fn new(data_dir: PathBuf, args: StoreArgs) -> Self {
        Self { data_dir, args }
    }
}

impl Command for StoreCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match self.args.action {
            StoreAction::List => {
                let store = FileStore::new(&self.data_dir);
                let keys = store.keys()?;
                if keys.is_empty() {
                    ui.message(&format!("No values stored in {}", self.data_dir.display()));
                    return Ok(CommandResult::success());
                }

                let mut table = Table::new(&["Key", "Bytes"]);
                for key in &keys {
                    let size = store.get(key)?.map_or(0, |v| v.len());
                    table.add_row(&[key.to_string(), size.to_string()]);
                }
                ui.emit(&table.render());
            }
        }
        Ok(CommandResult::success())
    }
}
