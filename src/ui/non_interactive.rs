//! Non-interactive UI for pipes and scripts.

use std::collections::HashMap;

use crate::error::{LiftlogError, Result};

use super::{
    CountdownBar, CountdownHandle, OutputMode, Prompt, PromptResult, PromptType, UserInterface,
};

const PROMPT_ENV_PREFIX: &str = "LIFTLOG_PROMPT_";

/// UI implementation for non-interactive mode.
///
/// Prompts are answered from `LIFTLOG_PROMPT_<KEY>` environment variables,
/// then from the prompt's default. Countdowns draw nothing.
pub struct NonInteractiveUI {
    mode: OutputMode,
    env_overrides: HashMap<String, String>,
}

impl NonInteractiveUI {
    pub fn new(mode: OutputMode) -> Self {
        let env_overrides = std::env::vars()
            .filter(|(k, _)| k.starts_with(PROMPT_ENV_PREFIX))
            .collect();

        Self {
            mode,
            env_overrides,
        }
    }

    /// Create with explicit overrides (for testing).
    pub fn with_overrides(mode: OutputMode, overrides: HashMap<String, String>) -> Self {
        Self {
            mode,
            env_overrides: overrides,
        }
    }
}

impl UserInterface for NonInteractiveUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn emit(&mut self, text: &str) {
        println!("{}", text);
    }

    fn message(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("{}", msg);
        }
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            println!("✓ {}", msg);
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            eprintln!("⚠ {}", msg);
        }
    }

    fn error(&mut self, msg: &str) {
        eprintln!("✗ {}", msg);
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            println!("\n{}\n", title);
        }
    }

    fn prompt(&mut self, prompt: &Prompt) -> Result<PromptResult> {
        let env_key = format!("{}{}", PROMPT_ENV_PREFIX, prompt.key.to_uppercase());
        let answer = self
            .env_overrides
            .get(&env_key)
            .or(prompt.default.as_ref())
            .cloned()
            .ok_or_else(|| {
                LiftlogError::Other(anyhow::anyhow!(
                    "Cannot prompt for '{}' in non-interactive mode (set {})",
                    prompt.key,
                    env_key
                ))
            })?;

        match prompt.prompt_type {
            PromptType::Confirm => Ok(PromptResult::Bool(
                super::parse_bool(Some(&answer)).unwrap_or(false),
            )),
            PromptType::Input => Ok(PromptResult::String(answer)),
        }
    }

    fn start_countdown(&mut self, label: &str, total_secs: u64) -> Box<dyn CountdownHandle> {
        if self.mode.shows_status() {
            println!("{}: {}s", label, total_secs);
        }
        Box::new(CountdownBar::hidden(total_secs))
    }

    fn is_interactive(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confirm_uses_default_without_override() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let result = ui.prompt(&Prompt::confirm("reset", "Reset?", false)).unwrap();
        assert_eq!(result, PromptResult::Bool(false));
    }

    #[test]
    fn env_override_wins_over_default() {
        let overrides = HashMap::from([("LIFTLOG_PROMPT_RESET".to_string(), "yes".to_string())]);
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, overrides);
        let result = ui.prompt(&Prompt::confirm("reset", "Reset?", false)).unwrap();
        assert_eq!(result, PromptResult::Bool(true));
    }

    #[test]
    fn input_without_answer_is_an_error() {
        let mut ui = NonInteractiveUI::with_overrides(OutputMode::Normal, HashMap::new());
        let err = ui.prompt(&Prompt::input("note", "Note?")).unwrap_err();
        assert!(err.to_string().contains("LIFTLOG_PROMPT_NOTE"));
    }

    #[test]
    fn never_interactive() {
        assert!(!NonInteractiveUI::new(OutputMode::Quiet).is_interactive());
    }
}
