//! Configuration loading, parsing, and validation for liftlog.
//!
//! - Schema definitions in [`schema`]
//! - File discovery and loading in [`loader`]
//! - Validation in [`validator`]
//!
//! # Example
//!
//! ```
//! use liftlog::config::load_config;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join("config.yml");
//! fs::write(&path, "rest_duration_secs: 90").unwrap();
//!
//! let config = load_config(Some(&path)).unwrap();
//! assert_eq!(config.rest_duration_secs, 90);
//! assert!(config.bell);
//! ```

pub mod loader;
pub mod schema;
pub mod validator;

pub use loader::{load_config, load_config_file, parse_config, user_config_path};
pub use schema::{default_data_dir, LiftlogConfig};
pub use validator::validate;
