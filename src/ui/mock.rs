//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion. It can be configured with
//! pre-determined prompt responses.
//!
//! # Example
//!
//! ```
//! use liftlog::ui::{MockUI, Prompt, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.set_prompt_response("reset", "yes");
//!
//! let answer = ui.prompt(&Prompt::confirm("reset", "Reset?", false)).unwrap();
//! ui.success("Workout reset");
//!
//! assert_eq!(answer.as_bool(), Some(true));
//! assert!(ui.has_success("reset"));
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::error::{LiftlogError, Result};

use super::{CountdownHandle, OutputMode, Prompt, PromptResult, PromptType, UserInterface};

/// Events recorded by a [`MockCountdown`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CountdownEvent {
    Started { label: String, total: u64 },
    Remaining(u64),
    Finished(String),
    Cancelled(String),
}

/// Countdown handle that records into its `MockUI`.
pub struct MockCountdown {
    log: Rc<RefCell<Vec<CountdownEvent>>>,
}

impl CountdownHandle for MockCountdown {
    fn set_remaining(&mut self, secs: u64) {
        self.log.borrow_mut().push(CountdownEvent::Remaining(secs));
    }

    fn finish(&mut self, msg: &str) {
        self.log
            .borrow_mut()
            .push(CountdownEvent::Finished(msg.to_string()));
    }

    fn cancel(&mut self, msg: &str) {
        self.log
            .borrow_mut()
            .push(CountdownEvent::Cancelled(msg.to_string()));
    }
}

/// Mock UI implementation for testing.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    emitted: Vec<String>,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    prompt_responses: HashMap<String, String>,
    prompts_shown: Vec<String>,
    countdown: Rc<RefCell<Vec<CountdownEvent>>>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Set a response for a prompt key.
    pub fn set_prompt_response(&mut self, key: &str, response: &str) {
        self.prompt_responses
            .insert(key.to_string(), response.to_string());
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    /// Everything passed to `emit`, joined by newlines.
    pub fn output(&self) -> String {
        self.emitted.join("\n")
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Keys of every prompt shown.
    pub fn prompts_shown(&self) -> &[String] {
        &self.prompts_shown
    }

    pub fn countdown_events(&self) -> Vec<CountdownEvent> {
        self.countdown.borrow().clone()
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn emit(&mut self, text: &str) {
        self.emitted.push(text.to_string());
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        self.prompts_shown.push(prompt.key.clone());

        let answer = self
            .prompt_responses
            .get(&prompt.key)
            .or(prompt.default.as_ref())
            .cloned()
            .ok_or_else(|| {
                LiftlogError::Other(anyhow::anyhow!("No mock response for '{}'", prompt.key))
            })?;

        Ok(match prompt.prompt_type {
            PromptType::Confirm => PromptResult::Bool(super::parse_bool(Some(&answer)).unwrap_or(false)),
            PromptType::Input => PromptResult::String(answer),
        })
    }

    fn start_countdown(&mut self, label: &str, total_secs: u64) -> Box<dyn CountdownHandle> {
        self.countdown.borrow_mut().push(CountdownEvent::Started {
            label: label.to_string(),
            total: total_secs,
        });
        Box::new(MockCountdown {
            log: Rc::clone(&self.countdown),
        })
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}
