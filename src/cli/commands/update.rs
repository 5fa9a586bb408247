//! Update check and manifest commands.
//!
//! `liftlog check-update` asks the deployment once for its version;
//! `liftlog version bump` rewrites a `version.json` for a new release.

use chrono::Utc;

use crate::cli::args::{CheckUpdateArgs, VersionAction, VersionArgs};
use crate::config::LiftlogConfig;
use crate::error::Result;
use crate::ui::UserInterface;
use crate::updates::{bump_file, UpdateChecker, VersionSource, VERSION};

use super::dispatcher::{Command, CommandResult};

/// The check-update command implementation.
pub struct CheckUpdateCommand {
    url: Option<String>,
    current: String,
}

impl CheckUpdateCommand {
    /// Create a new check-update command; `--url` wins over the config.
    pub fn new(config: &LiftlogConfig, args: CheckUpdateArgs) -> Self {
        Self {
            url: args.url.or_else(|| config.update_url.clone()),
            current: VERSION.to_string(),
        }
    }

    /// Compare against `version` instead of this build's.
    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current = version.into();
        self
    }
}

impl Command for CheckUpdateCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let Some(url) = &self.url else {
            ui.warning("No update URL configured; set update_url or pass --url");
            return Ok(CommandResult::failure(2));
        };

        let checker = UpdateChecker::new(url.as_str())?.with_current_version(self.current.as_str());
        let status = checker.check(Utc::now().timestamp_millis());

        if status.has_update {
            ui.warning(&format!(
                "Version {} is available (running {})",
                status.latest_version, status.current_version
            ));
        } else {
            ui.success(&format!("liftlog {} is up to date", status.current_version));
        }

        Ok(CommandResult::success())
    }
}

/// The version command implementation.
pub struct VersionCommand {
    args: VersionArgs,
}

impl VersionCommand {
    pub fn new(args: VersionArgs) -> Self {
        Self { args }
    }
}

impl Command for VersionCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &self.args.action {
            VersionAction::Bump { file } => {
                let (previous, next) = bump_file(file)?;
                ui.success(&format!("Version incremented: {} -> {}", previous, next));
            }
        }
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;
    use httpmock::prelude::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn without_url_nothing_is_checked() {
        let mut ui = MockUI::new();
        let cmd = CheckUpdateCommand::new(&LiftlogConfig::default(), CheckUpdateArgs::default());

        let result = cmd.execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 2);
        assert!(ui.has_warning("No update URL"));
    }

    #[test]
    fn reports_available_update() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/version.json");
            then.status(200).json_body(serde_json::json!({ "version": "2.0.0" }));
        });
        let mut ui = MockUI::new();
        let args = CheckUpdateArgs {
            url: Some(server.base_url()),
        };

        CheckUpdateCommand::new(&LiftlogConfig::default(), args)
            .with_current_version("1.9.9")
            .execute(&mut ui)
            .unwrap();

        assert!(ui.has_warning("Version 2.0.0 is available (running 1.9.9)"));
    }

    #[test]
    fn config_url_is_used() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/version.json");
            then.status(200).json_body(serde_json::json!({ "version": "1.9.9" }));
        });
        let config = LiftlogConfig {
            update_url: Some(server.base_url()),
            ..Default::default()
        };
        let mut ui = MockUI::new();

        CheckUpdateCommand::new(&config, CheckUpdateArgs::default())
            .with_current_version("1.9.9")
            .execute(&mut ui)
            .unwrap();

        mock.assert();
        assert!(ui.has_success("up to date"));
    }

    #[test]
    fn unreachable_server_is_up_to_date() {
        let mut ui = MockUI::new();
        let args = CheckUpdateArgs {
            url: Some("http://127.0.0.1:9".into()),
        };

        let result = CheckUpdateCommand::new(&LiftlogConfig::default(), args)
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_success("up to date"));
    }

    #[test]
    fn bump_rewrites_manifest() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.json");
        fs::write(&path, r#"{"version": "1.4.9"}"#).unwrap();
        let mut ui = MockUI::new();

        VersionCommand::new(VersionArgs {
            action: VersionAction::Bump { file: path.clone() },
        })
        .execute(&mut ui)
        .unwrap();

        assert!(ui.has_success("1.4.9 -> 1.4.10"));
        assert!(fs::read_to_string(&path).unwrap().contains("\"1.4.10\""));
    }

    #[test]
    fn bump_of_missing_file_fails() {
        let temp = TempDir::new().unwrap();
        let mut ui = MockUI::new();

        let result = VersionCommand::new(VersionArgs {
            action: VersionAction::Bump {
                file: temp.path().join("missing.json"),
            },
        })
        .execute(&mut ui);

        assert!(result.is_err());
    }
}
