//! Version checking against the deployed `version.json`.

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::manifest::VersionManifest;

/// Current version of liftlog.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Request timeout for version checks.
const CHECK_TIMEOUT_SECS: u64 = 10;

/// Outcome of the latest version check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateStatus {
    /// Whether a check is in flight.
    pub checking: bool,
    /// Whether the deployed version differs from ours.
    pub has_update: bool,
    /// Version reported by the server, or ours when unknown.
    pub latest_version: String,
    /// Version of this build.
    pub current_version: String,
}

impl UpdateStatus {
    /// Status before any check, or after a failed one.
    pub fn up_to_date(current: &str) -> Self {
        Self {
            checking: false,
            has_update: false,
            latest_version: current.to_string(),
            current_version: current.to_string(),
        }
    }

    fn from_latest(latest: String, current: &str) -> Self {
        Self {
            checking: false,
            has_update: has_update(&latest, current),
            latest_version: latest,
            current_version: current.to_string(),
        }
    }
}

/// Any version differing from the running one counts as an update,
/// including an older one (a rollback).
pub fn has_update(latest: &str, current: &str) -> bool {
    latest != current
}

/// Something that can report the latest deployed version.
pub trait VersionSource {
    fn latest_version(&self, timestamp_ms: i64) -> Result<String>;

    /// The version this build runs.
    fn current_version(&self) -> &str {
        VERSION
    }

    /// Check once; any failure reads as "no update".
    fn check(&self, timestamp_ms: i64) -> UpdateStatus {
        let current = self.current_version();
        match self.latest_version(timestamp_ms) {
            Ok(latest) => UpdateStatus::from_latest(latest, current),
            Err(e) => {
                tracing::error!("Failed to check for updates: {:#}", e);
                UpdateStatus::up_to_date(current)
            }
        }
    }
}

/// HTTP client for `GET <base>/version.json`.
pub struct UpdateChecker {
    base_url: String,
    current: String,
    client: reqwest::blocking::Client,
}

impl UpdateChecker {
    /// Create a checker for the deployment at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(concat!("liftlog/", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(CHECK_TIMEOUT_SECS))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.into(),
            current: VERSION.to_string(),
            client,
        })
    }

    /// Compare against `version` instead of this build's.
    pub fn with_current_version(mut self, version: impl Into<String>) -> Self {
        self.current = version.into();
        self
    }

    /// Cache-busting URL of the version document.
    pub fn version_url(&self, timestamp_ms: i64) -> String {
        format!(
            "{}/version.json?timestamp={}",
            self.base_url.trim_end_matches('/'),
            timestamp_ms
        )
    }
}

impl VersionSource for UpdateChecker {
    fn latest_version(&self, timestamp_ms: i64) -> Result<String> {
        let url = self.version_url(timestamp_ms);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::CACHE_CONTROL, "no-cache")
            .send()
            .with_context(|| format!("Failed to fetch {}", url))?;

        if !response.status().is_success() {
            return Err(anyhow!("Failed to fetch version: {}", response.status()));
        }

        let manifest: VersionManifest = response
            .json()
            .context("Failed to parse version response")?;
        Ok(manifest.version)
    }

    fn current_version(&self) -> &str {
        &self.current
    }
}
