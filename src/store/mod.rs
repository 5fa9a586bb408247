//! Durable key/value storage.
//!
//! The [`KeyValueStore`] trait is the only contract the rest of the crate
//! needs from persistent storage: synchronous `get` and `set`, where setting
//! `None` removes the entry. Notification is deliberately not part of it;
//! see [`crate::notify`].
//!
//! - [`MemoryStore`] keeps entries in process and can be shared between
//!   runtimes to model several contexts on one origin
//! - [`FileStore`] keeps one file per key in a data directory, so every
//!   process opened on that directory sees the same values

pub mod file;
pub mod key;
pub mod memory;

pub use file::FileStore;
pub use key::PersistedKey;
pub use memory::MemoryStore;

use crate::error::Result;

/// Synchronous persistent key/value storage.
pub trait KeyValueStore {
    /// Read the envelope stored under `key`, or `None` when absent.
    fn get(&self, key: &PersistedKey) -> Result<Option<String>>;

    /// Write `value` under `key`. `None` removes the entry.
    fn set(&self, key: &PersistedKey, value: Option<&str>) -> Result<()>;
}

/// Build the storage fault for `key` from any displayable cause.
pub(crate) fn unavailable(key: &PersistedKey, cause: impl std::fmt::Display) -> crate::LiftlogError {
    crate::LiftlogError::StorageUnavailable {
        key: key.to_string(),
        message: cause.to_string(),
    }
}
