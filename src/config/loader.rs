//! Configuration file discovery and loading.

use crate::config::schema::LiftlogConfig;
use crate::config::validator::validate;
use crate::error::{LiftlogError, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// User config location: `~/.liftlog/config.yml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".liftlog").join("config.yml"))
}

/// Load a config file.
///
/// # Errors
///
/// Returns `ConfigNotFound` if the file doesn't exist.
/// Returns `ConfigParseError` if the YAML is invalid.
pub fn load_config_file(path: &Path) -> Result<LiftlogConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            LiftlogError::ConfigNotFound {
                path: path.to_path_buf(),
            }
        } else {
            LiftlogError::Io(e)
        }
    })?;

    parse_config(&content, path)
}

/// Parse YAML content into LiftlogConfig.
///
/// An empty document yields the defaults.
pub fn parse_config(content: &str, source_path: &Path) -> Result<LiftlogConfig> {
    if content.trim().is_empty() {
        return Ok(LiftlogConfig::default());
    }

    serde_yaml::from_str(content).map_err(|e| LiftlogError::ConfigParseError {
        path: source_path.to_path_buf(),
        message: e.to_string(),
    })
}

/// Load config with optional path override, then validate it.
///
/// An explicit `config_override` must exist. Without one the user config
/// is used when present and the defaults otherwise.
pub fn load_config(config_override: Option<&Path>) -> Result<LiftlogConfig> {
    let config = match config_override {
        Some(path) => load_config_file(path)?,
        None => match user_config_path().filter(|p| p.exists()) {
            Some(path) => {
                tracing::debug!("Loading config from {}", path.display());
                load_config_file(&path)?
            }
            None => LiftlogConfig::default(),
        },
    };

    validate(&config)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn load_config_file_parses_valid_yaml() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "rest_duration_secs: 45\nupdate_url: https://lift.example\n").unwrap();

        let config = load_config_file(&path).unwrap();

        assert_eq!(config.rest_duration_secs, 45);
        assert_eq!(config.update_url.as_deref(), Some("https://lift.example"));
    }

    #[test]
    fn load_config_file_returns_not_found_error() {
        let result = load_config_file(Path::new("/nonexistent/config.yml"));
        assert!(matches!(result, Err(LiftlogError::ConfigNotFound { .. })));
    }

    #[test]
    fn parse_config_returns_parse_error_for_invalid_yaml() {
        let result = parse_config("rest_duration_secs: [", Path::new("test.yml"));
        assert!(matches!(result, Err(LiftlogError::ConfigParseError { .. })));
    }

    #[test]
    fn parse_config_rejects_wrong_types() {
        let result = parse_config("bell: loud", Path::new("test.yml"));
        assert!(matches!(result, Err(LiftlogError::ConfigParseError { .. })));
    }

    #[test]
    fn load_config_file_handles_empty_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "").unwrap();

        assert_eq!(load_config_file(&path).unwrap(), LiftlogConfig::default());
    }

    #[test]
    fn load_config_validates_override() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.yml");
        fs::write(&path, "rest_duration_secs: 0\n").unwrap();

        let result = load_config(Some(&path));

        assert!(matches!(result, Err(LiftlogError::ConfigValidationError { .. })));
    }
}
