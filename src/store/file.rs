//! Directory-backed store.

use sha2::{Digest, Sha256};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::{unavailable, KeyValueStore, PersistedKey};
use crate::error::{LiftlogError, Result};

/// Store keeping one file per key under a root directory.
///
/// File names are derived from a SHA-256 digest of the key; a `.key`
/// sidecar records the original key so the directory can be listed.
/// Every process opened on the same root shares the same values.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    /// Create a store rooted at `root`. The directory is created lazily.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Get the store root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of the file holding the envelope for `key`.
    pub fn value_path(&self, key: &PersistedKey) -> PathBuf {
        let hash = Sha256::digest(key.as_str().as_bytes());
        let hash_str = hex::encode(&hash[..16]);
        self.root.join(format!("{}.json", hash_str))
    }

    fn key_path(&self, key: &PersistedKey) -> PathBuf {
        self.value_path(key).with_extension("key")
    }

    /// List every key currently stored, sorted.
    pub fn keys(&self) -> Result<Vec<PersistedKey>> {
        let entries = match fs::read_dir(&self.root) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|e| e == "key") && path.with_extension("json").exists() {
                if let Ok(raw) = fs::read_to_string(&path) {
                    if let Ok(key) = PersistedKey::parse(raw.trim()) {
                        keys.push(key);
                    }
                }
            }
        }

        keys.sort();
        Ok(keys)
    }

    fn write_atomic(&self, key: &PersistedKey, path: &Path, content: &str) -> Result<()> {
        // Per-process temp name so concurrent writers never share one.
        let temp_path = path.with_extension(format!("{}.tmp", std::process::id()));
        fs::write(&temp_path, content).map_err(|e| unavailable(key, e))?;
        fs::rename(&temp_path, path).map_err(|e| {
            let _ = fs::remove_file(&temp_path);
            unavailable(key, e)
        })
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &PersistedKey) -> Result<Option<String>> {
        let bytes = match fs::read(self.value_path(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(key, e)),
        };

        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| LiftlogError::CorruptValue {
                key: key.to_string(),
                message: e.to_string(),
            })
    }

    fn set(&self, key: &PersistedKey, value: Option<&str>) -> Result<()> {
        let path = self.value_path(key);

        match value {
            Some(value) => {
                fs::create_dir_all(&self.root).map_err(|e| unavailable(key, e))?;
                let key_path = self.key_path(key);
                if !key_path.exists() {
                    fs::write(&key_path, key.as_str()).map_err(|e| unavailable(key, e))?;
                }
                self.write_atomic(key, &path, value)?;
                tracing::debug!("Stored {} bytes under {}", value.len(), key);
            }
            None => {
                match fs::remove_file(&path) {
                    Ok(()) => tracing::debug!("Removed {}", key),
                    Err(e) if e.kind() == ErrorKind::NotFound => {}
                    Err(e) => return Err(unavailable(key, e)),
                }
                let _ = fs::remove_file(self.key_path(key));
            }
        }

        Ok(())
    }
}
