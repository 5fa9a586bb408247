//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which owns the one
//! [`Runtime`](crate::runtime::Runtime) of the process and routes CLI
//! subcommands to their implementations. This allows:
//! - Single binary with subcommands (`liftlog set`, `liftlog rest start`)
//! - One store and event loop shared by every command
//! - Consistent global flag handling

pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod log;
pub mod rest;
pub mod show;
pub mod store;
pub mod transfer;
pub mod update;
pub mod watch;

pub use dispatcher::{Command, CommandDispatcher, CommandResult};
