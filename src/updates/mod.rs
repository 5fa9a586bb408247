//! Update checking and the version manifest.
//!
//! This module provides:
//! - Version checks against the deployed `version.json`
//! - Periodic checks on a context's event loop
//! - Reading, writing, and bumping `version.json`

pub mod manifest;
pub mod poller;
pub mod version;

pub use manifest::{bump_file, bump_patch, VersionManifest};
pub use poller::{UpdatePoller, DEFAULT_CHECK_INTERVAL_MS};
pub use version::{has_update, UpdateChecker, UpdateStatus, VersionSource, VERSION};
