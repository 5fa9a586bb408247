//! Persisted key identifiers.

use std::fmt;
use std::str::FromStr;

use crate::error::{LiftlogError, Result};

/// Identifier of one persisted value, shaped `namespace:name`.
///
/// Two values stored under the same key alias each other, so every logical
/// value gets its own key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PersistedKey(String);

impl PersistedKey {
    /// Build a key from its parts.
    pub fn new(namespace: &str, name: &str) -> Self {
        Self(format!("{}:{}", namespace, name))
    }

    /// Parse and validate a `namespace:name` string.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.split_once(':') {
            Some((namespace, name)) if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self(raw.to_string()))
            }
            _ => Err(LiftlogError::InvalidKey {
                key: raw.to_string(),
            }),
        }
    }

    /// The full key text.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Everything before the first `:`.
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or(&self.0)
    }

    /// Everything after the first `:`.
    pub fn name(&self) -> &str {
        self.0.split_once(':').map(|(_, name)| name).unwrap_or("")
    }
}

impl fmt::Display for PersistedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for PersistedKey {
    type Err = LiftlogError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
