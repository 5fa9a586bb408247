//! Interactive prompts.

use console::{style, Term};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Confirm, Input};

use crate::error::{LiftlogError, Result};

use super::{Prompt, PromptResult, PromptType};

fn map_dialoguer_err(e: dialoguer::Error) -> LiftlogError {
    LiftlogError::Io(e.into())
}

/// Dialoguer theme without the default yellow `?` prefix.
fn prompt_theme() -> ColorfulTheme {
    ColorfulTheme {
        prompt_prefix: style("".to_string()),
        ..ColorfulTheme::default()
    }
}

/// Prompt the user on `term`.
pub fn prompt_user(prompt: &Prompt, term: &Term) -> Result<PromptResult> {
    match prompt.prompt_type {
        PromptType::Confirm => {
            let answer = Confirm::with_theme(&prompt_theme())
                .with_prompt(&prompt.question)
                .default(parse_bool(prompt.default.as_deref()).unwrap_or(false))
                .interact_on(term)
                .map_err(map_dialoguer_err)?;
            Ok(PromptResult::Bool(answer))
        }
        PromptType::Input => {
            let theme = prompt_theme();
            let mut input = Input::<String>::with_theme(&theme).with_prompt(&prompt.question);
            if let Some(default) = &prompt.default {
                input = input.default(default.clone());
            }
            let answer = input.interact_on(term).map_err(map_dialoguer_err)?;
            Ok(PromptResult::String(answer))
        }
    }
}

/// Read `y`/`yes`/`true` and `n`/`no`/`false`, case-insensitively.
pub fn parse_bool(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_lowercase().as_str() {
        "y" | "yes" | "true" => Some(true),
        "n" | "no" | "false" => Some(false),
        _ => None,
    }
}
