//! liftlog - Workout logging with a resumable rest timer.
//!
//! liftlog keeps a workout log and a rest countdown in a durable key/value
//! store shared by every session opened on the same data directory. A
//! change made in one terminal shows up in every other one, and a rest
//! period survives the process that started it.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Configuration loading and validation
//! - [`error`] - Error types and result aliases
//! - [`notify`] - Change events within and across contexts
//! - [`persisted`] - Reactive values bound to a store key
//! - [`runtime`] - Event loop, clock, and the per-context service bundle
//! - [`store`] - Durable key/value storage
//! - [`timer`] - The resumable rest countdown
//! - [`ui`] - Prompts, countdown bar, and terminal output
//! - [`updates`] - Deployment version checks and the version manifest
//! - [`wake`] - Screen wake lock and suspension handling
//! - [`workout`] - The exercise log, plan import, and report export
//!
//! # Example
//!
//! ```
//! use liftlog::runtime::Runtime;
//! use liftlog::workout::{SetField, WorkoutLog};
//!
//! let runtime = Runtime::in_memory();
//! let log = WorkoutLog::bind(&runtime).unwrap();
//! log.update_set(1, 0, SetField::Reps("8".into())).unwrap();
//!
//! // A second binding in the same context reads what the first wrote.
//! let again = WorkoutLog::bind(&runtime).unwrap();
//! assert_eq!(again.exercise(1).unwrap().sets[0].reps, "8");
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod notify;
pub mod persisted;
pub mod runtime;
pub mod store;
pub mod timer;
pub mod ui;
pub mod updates;
pub mod wake;
pub mod workout;

pub use error::{LiftlogError, Result};
