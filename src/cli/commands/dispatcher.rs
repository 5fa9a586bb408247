//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use crate::cli::args::{Cli, Commands, ShowArgs};
use crate::config::LiftlogConfig;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output and prompts
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
///
/// Owns the one [`Runtime`] of this process; every command borrows it.
pub struct CommandDispatcher {
    config: LiftlogConfig,
    runtime: Runtime,
}

impl CommandDispatcher {
    /// Create a dispatcher over the file store in the configured data dir.
    pub fn new(config: LiftlogConfig) -> Self {
        let data_dir = config.resolved_data_dir();
        tracing::debug!("Using data directory {}", data_dir.display());
        let runtime = Runtime::with_file_store(data_dir);
        Self { config, runtime }
    }

    /// Create a dispatcher over an existing runtime.
    pub fn with_runtime(config: LiftlogConfig, runtime: Runtime) -> Self {
        Self { config, runtime }
    }

    pub fn config(&self) -> &LiftlogConfig {
        &self.config
    }

    pub fn runtime(&self) -> &Runtime {
        &self.runtime
    }

    /// Dispatch and execute a command.
    ///
    /// Routes the CLI subcommand to the appropriate command implementation
    /// and executes it.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let result = match &cli.command {
            Some(Commands::Show(args)) => {
                let cmd = super::show::ShowCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Set(args)) => {
                let cmd = super::log::SetCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Note(args)) => {
                let cmd = super::log::NoteCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::AddSet(args)) => {
                let cmd = super::log::AddSetCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::RemoveSet(args)) => {
                let cmd = super::log::RemoveSetCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Reset(args)) => {
                let cmd = super::log::ResetCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Import(args)) => {
                let cmd = super::transfer::ImportCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Export(args)) => {
                let cmd = super::transfer::ExportCommand::new(&self.runtime, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Schema) => super::transfer::SchemaCommand::new().execute(ui),
            Some(Commands::Rest(args)) => {
                let cmd = super::rest::RestCommand::new(&self.runtime, &self.config, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Watch(args)) => {
                let cmd = super::watch::WatchCommand::new(&self.runtime, &self.config, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::CheckUpdate(args)) => {
                let cmd = super::update::CheckUpdateCommand::new(&self.config, args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Version(args)) => {
                let cmd = super::update::VersionCommand::new(args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Store(args)) => {
                let cmd = super::store::StoreCommand::new(self.config.resolved_data_dir(), args.clone());
                cmd.execute(ui)
            }
            Some(Commands::Completions(args)) => {
                let cmd = super::completions::CompletionsCommand::new(args.clone());
                cmd.execute(ui)
            }
            None => {
                // Default to show
                let cmd = super::show::ShowCommand::new(&self.runtime, ShowArgs::default());
                cmd.execute(ui)
            }
        };

        // Deliver anything the command left queued before the process exits.
        self.runtime.run_until_idle();
        result
    }
}
