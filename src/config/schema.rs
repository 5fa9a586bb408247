//! Configuration schema for liftlog.
//!
//! Maps to `~/.liftlog/config.yml`. Every field is optional.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::runtime::DEFAULT_POLL_INTERVAL_MS;
use crate::timer::DEFAULT_REST_SECS;
use crate::updates::DEFAULT_CHECK_INTERVAL_MS;

/// Root configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftlogConfig {
    /// Directory holding the durable store
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,

    /// Rest period started by `rest start`, in seconds
    pub rest_duration_secs: u64,

    /// Base URL serving `version.json`; no URL disables update checks
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update_url: Option<String>,

    /// Seconds between update checks in `watch`
    pub update_interval_secs: u64,

    /// Milliseconds between storage polls in `watch`
    pub poll_interval_ms: u64,

    /// Ring the terminal bell when a rest period ends
    pub bell: bool,
}

impl Default for LiftlogConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            rest_duration_secs: DEFAULT_REST_SECS,
            update_url: None,
            update_interval_secs: (DEFAULT_CHECK_INTERVAL_MS / 1_000) as u64,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS as u64,
            bell: true,
        }
    }
}

impl LiftlogConfig {
    /// Store directory: the configured one, else the platform data dir.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }
}

/// `<platform data dir>/liftlog`, falling back to `~/.liftlog/data`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("liftlog"))
        .or_else(|| dirs::home_dir().map(|h| h.join(".liftlog").join("data")))
        .unwrap_or_else(|| PathBuf::from(".liftlog"))
}
