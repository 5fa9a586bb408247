//! CLI argument definitions.
//!
//! This module defines all CLI arguments using clap's derive macros.
//! The main entry point is the [`Cli`] struct.

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::timer::MAX_REST_SECS;

/// liftlog - Workout log and rest timer for the terminal.
#[derive(Debug, Parser)]
#[command(name = "liftlog")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to config file (overrides default ~/.liftlog/config.yml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory holding the workout store
    #[arg(long, global = true, env = "LIFTLOG_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Minimal output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Show the current workout (default if no command specified)
    Show(ShowArgs),

    /// Record load or reps for one set
    Set(SetArgs),

    /// Replace an exercise's note
    Note(NoteArgs),

    /// Append a set at the exercise's default load
    AddSet(AddSetArgs),

    /// Remove a set (the last remaining set is kept)
    RemoveSet(RemoveSetArgs),

    /// Restore the default workout template
    Reset(ResetArgs),

    /// Replace the workout with an exercise plan
    Import(ImportArgs),

    /// Print today's workout report or the current plan
    Export(ExportArgs),

    /// Control the rest timer
    Rest(RestArgs),

    /// Live view of the workout and rest timer
    Watch(WatchArgs),

    /// Ask the deployment for a newer version
    CheckUpdate(CheckUpdateArgs),

    /// Manage a version.json manifest
    Version(VersionArgs),

    /// Print the JSON Schema of the import format
    Schema,

    /// Inspect the workout store
    Store(StoreArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the `show` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ShowArgs {
    /// Print the stored exercises as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `set` command.
#[derive(Debug, Clone, Args)]
pub struct SetArgs {
    /// Exercise id
    pub id: u32,

    /// Set number, starting at 1
    pub set: usize,

    /// Load in pounds
    #[arg(short, long)]
    pub load: Option<f64>,

    /// Reps performed (free text)
    #[arg(short, long)]
    pub reps: Option<String>,
}

/// Arguments for the `note` command.
#[derive(Debug, Clone, Args)]
pub struct NoteArgs {
    /// Exercise id
    pub id: u32,

    /// Note text; an empty string clears the note
    pub text: String,
}

/// Arguments for the `add-set` command.
#[derive(Debug, Clone, Args)]
pub struct AddSetArgs {
    /// Exercise id
    pub id: u32,
}

/// Arguments for the `remove-set` command.
#[derive(Debug, Clone, Args)]
pub struct RemoveSetArgs {
    /// Exercise id
    pub id: u32,

    /// Set number, starting at 1
    pub set: usize,
}

/// Arguments for the `reset` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ResetArgs {
    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub force: bool,
}

/// Arguments for the `import` command.
#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// Plan file to read, or `-` for stdin
    pub source: String,
}

/// Arguments for the `export` command.
#[derive(Debug, Clone, Default, Args)]
pub struct ExportArgs {
    /// Export the importable plan instead of the report
    #[arg(long)]
    pub plan: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

/// Arguments for the `rest` command.
#[derive(Debug, Clone, Args)]
pub struct RestArgs {
    #[command(subcommand)]
    pub action: RestAction,
}

/// Rest timer actions.
#[derive(Debug, Clone, Subcommand)]
pub enum RestAction {
    /// Start a rest period
    Start(RestStartArgs),

    /// Stop the running rest period
    Stop,

    /// Start when idle, stop when running
    Toggle(RestToggleArgs),

    /// Show the remaining rest time
    Status,
}

/// Arguments for `rest start`.
#[derive(Debug, Clone, Default, Args)]
pub struct RestStartArgs {
    /// Rest duration in seconds (default from config)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_REST_SECS))]
    pub duration: Option<u64>,

    /// Stay in the foreground and show the countdown
    #[arg(short, long)]
    pub wait: bool,

    /// Do not ring the bell when the rest ends
    #[arg(long)]
    pub no_bell: bool,
}

/// Arguments for `rest toggle`.
#[derive(Debug, Clone, Default, Args)]
pub struct RestToggleArgs {
    /// Rest duration in seconds when starting (default from config)
    #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..=MAX_REST_SECS))]
    pub duration: Option<u64>,
}

/// Arguments for the `watch` command.
#[derive(Debug, Clone, Default, Args)]
pub struct WatchArgs {
    /// Stop watching after this many seconds
    #[arg(long = "for", value_name = "SECS")]
    pub duration: Option<u64>,

    /// Do not ring the bell when a rest ends
    #[arg(long)]
    pub no_bell: bool,

    /// Keep the screen awake while watching
    #[arg(long)]
    pub keep_awake: bool,
}

/// Arguments for the `check-update` command.
#[derive(Debug, Clone, Default, Args)]
pub struct CheckUpdateArgs {
    /// Base URL serving version.json (overrides config)
    #[arg(long)]
    pub url: Option<String>,
}

/// Arguments for the `version` command.
#[derive(Debug, Clone, Args)]
pub struct VersionArgs {
    #[command(subcommand)]
    pub action: VersionAction,
}

/// Manifest actions.
#[derive(Debug, Clone, Subcommand)]
pub enum VersionAction {
    /// Increment the patch component of a version.json file
    Bump {
        /// Manifest to rewrite
        file: PathBuf,
    },
}

/// Arguments for the `store` command.
#[derive(Debug, Clone, Args)]
pub struct StoreArgs {
    #[command(subcommand)]
    pub action: StoreAction,
}

/// Store diagnostics.
#[derive(Debug, Clone, Subcommand)]
pub enum StoreAction {
    /// List stored keys and their sizes
    List,
}

/// Arguments for the `completions` command.
#[derive(Debug, Clone, Args)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    pub shell: Shell,
}
