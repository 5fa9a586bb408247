//! Error types for liftlog operations.
//!
//! This module defines [`LiftlogError`], the primary error type used throughout
//! the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Storage faults are fatal to the write attempt and propagate to the caller
//! - Corrupted persisted values surface as `CorruptValue` at most as far as
//!   the binding, which logs them and falls back to "absent"
//! - Use `anyhow::Error` (via `LiftlogError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for liftlog operations.
#[derive(Debug, Error)]
pub enum LiftlogError {
    /// The durable store rejected a read or write (disabled, full, unwritable).
    #[error("Storage unavailable for '{key}': {message}")]
    StorageUnavailable { key: String, message: String },

    /// A rest duration outside what the timer can represent.
    #[error("Rest duration of {secs}s is out of range")]
    InvalidDuration { secs: u64 },

    /// A persisted value could not be decoded.
    #[error("Corrupt value under '{key}': {message}")]
    CorruptValue { key: String, message: String },

    /// A persisted key did not have the `namespace:name` shape.
    #[error("Invalid key '{key}': expected namespace:name")]
    InvalidKey { key: String },

    /// An import payload was rejected. The log is left untouched.
    #[error("Invalid import: {message}")]
    InvalidImport { message: String },

    /// No exercise with this id exists in the log.
    #[error("Unknown exercise id {id}")]
    UnknownExercise { id: u32 },

    /// A set index pointed past the end of an exercise's set list.
    #[error("Exercise {id} has {len} sets, no set at position {}", index + 1)]
    SetOutOfRange { id: u32, index: usize, len: usize },

    /// Configuration file not found at expected location.
    #[error("Configuration not found: {path}")]
    ConfigNotFound { path: PathBuf },

    /// Failed to parse configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParseError { path: PathBuf, message: String },

    /// Invalid configuration values.
    #[error("Invalid configuration: {message}")]
    ConfigValidationError { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for liftlog operations.
pub type Result<T> = std::result::Result<T, LiftlogError>;
