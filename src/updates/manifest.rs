//! The `version.json` manifest served next to the app.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Contents of `version.json`. Fields other than `version` are preserved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VersionManifest {
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VersionManifest {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            extra: Map::new(),
        }
    }

    /// Read a manifest file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Write the manifest as two-space indented JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
    }

    /// Increment the patch component. Returns the previous version.
    pub fn bump_patch(&mut self) -> Result<String> {
        let next = bump_patch(&self.version)?;
        Ok(std::mem::replace(&mut self.version, next))
    }
}

/// `major.minor.patch` with the patch incremented.
pub fn bump_patch(version: &str) -> Result<String> {
    let parts: Vec<&str> = version.split('.').collect();
    let [major, minor, patch] = parts.as_slice() else {
        return Err(anyhow!("Version '{}' is not major.minor.patch", version));
    };

    let parse = |part: &str| -> Result<u64> {
        part.parse()
            .with_context(|| format!("Version '{}' has a non-numeric part '{}'", version, part))
    };

    Ok(format!(
        "{}.{}.{}",
        parse(*major)?,
        parse(*minor)?,
        parse(*patch)? + 1
    ))
}

/// Bump the manifest at `path` in place. Returns `(previous, next)`.
pub fn bump_file(path: &Path) -> Result<(String, String)> {
    let mut manifest = VersionManifest::load(path)?;
    let previous = manifest.bump_patch()?;
    manifest.save(path)?;
    tracing::info!("Version incremented: {} -> {}", previous, manifest.version);
    Ok((previous, manifest.version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn bump_patch_increments_last_component() {
        assert_eq!(bump_patch("1.2.3").unwrap(), "1.2.4");
        assert_eq!(bump_patch("0.0.9").unwrap(), "0.0.10");
    }

    #[test]
    fn bump_patch_rejects_other_shapes() {
        assert!(bump_patch("1.2").is_err());
        assert!(bump_patch("1.2.3.4").is_err());
        assert!(bump_patch("1.x.3").is_err());
    }

    #[test]
    fn bump_file_rewrites_version_and_keeps_other_fields() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.json");
        fs::write(&path, r#"{"version":"0.4.1","buildDate":"2024-03-07"}"#).unwrap();

        let (previous, next) = bump_file(&path).unwrap();

        assert_eq!((previous.as_str(), next.as_str()), ("0.4.1", "0.4.2"));
        let manifest = VersionManifest::load(&path).unwrap();
        assert_eq!(manifest.version, "0.4.2");
        assert_eq!(manifest.extra["buildDate"], "2024-03-07");
    }

    #[test]
    fn save_uses_two_space_indent() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("version.json");

        VersionManifest::new("1.0.0").save(&path).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "{\n  \"version\": \"1.0.0\"\n}");
    }

    #[test]
    fn load_reports_missing_file() {
        let temp = TempDir::new().unwrap();
        let err = VersionManifest::load(&temp.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read"));
    }
}
