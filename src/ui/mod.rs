//! Terminal user interface.
//!
//! This module provides:
//! - [`UserInterface`] trait for UI abstraction
//! - [`TerminalUI`] for interactive terminal usage
//! - [`NonInteractiveUI`] for pipes and scripts
//! - [`MockUI`] for tests
//! - Prompts, the rest countdown bar, and tables
//!
//! # Example
//!
//! ```
//! use liftlog::ui::{create_ui, OutputMode};
//!
//! let mut ui = create_ui(false, OutputMode::Quiet);
//! ui.success("Saved");
//! ```

pub mod countdown;
pub mod mock;
pub mod non_interactive;
pub mod output;
pub mod prompts;
pub mod table;
pub mod terminal;
pub mod theme;

pub use countdown::CountdownBar;
pub use mock::MockUI;
pub use non_interactive::NonInteractiveUI;
pub use output::OutputMode;
pub use prompts::{parse_bool, prompt_user};
pub use table::Table;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, LiftlogTheme};

use crate::error::Result;

/// Trait for user interface interactions.
///
/// This trait allows mocking the UI in tests.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    /// Print command output. Shown in every mode.
    fn emit(&mut self, text: &str);

    /// Display a status message.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    /// Display an error message. Shown in every mode.
    fn error(&mut self, msg: &str);

    fn show_header(&mut self, title: &str);

    /// Show a prompt and get user input.
    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult>;

    /// Start a countdown display of `total_secs`.
    fn start_countdown(&mut self, label: &str, total_secs: u64) -> Box<dyn CountdownHandle>;

    fn is_interactive(&self) -> bool;
}

/// Handle for a live countdown display.
pub trait CountdownHandle {
    fn set_remaining(&mut self, secs: u64);

    /// The countdown reached zero.
    fn finish(&mut self, msg: &str);

    /// The countdown was stopped early.
    fn cancel(&mut self, msg: &str);
}

/// A prompt to show to the user.
#[derive(Debug, Clone)]
pub struct Prompt {
    /// Key used for `LIFTLOG_PROMPT_<KEY>` overrides.
    pub key: String,
    pub question: String,
    pub prompt_type: PromptType,
    /// Default value if user just presses enter.
    pub default: Option<String>,
}

impl Prompt {
    /// A yes/no question.
    pub fn confirm(key: &str, question: &str, default: bool) -> Self {
        Self {
            key: key.to_string(),
            question: question.to_string(),
            prompt_type: PromptType::Confirm,
            default: Some(default.to_string()),
        }
    }

    /// A free-form question.
    pub fn input(key: &str, question: &str) -> Self {
        Self {
            key: key.to_string(),
            question: question.to_string(),
            prompt_type: PromptType::Input,
            default: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptType {
    Confirm,
    Input,
}

/// Result of a prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResult {
    Bool(bool),
    String(String),
}

impl PromptResult {
    pub fn as_string(&self) -> String {
        match self {
            Self::Bool(b) => b.to_string(),
            Self::String(s) => s.clone(),
        }
    }

    /// Boolean reading of the answer; text answers are parsed.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::String(s) => parse_bool(Some(s)),
        }
    }
}
