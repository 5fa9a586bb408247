//! In-process store.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

use super::{unavailable, KeyValueStore, PersistedKey};
use crate::error::Result;

/// Store backed by an in-memory map.
///
/// Clones share the same entries, which is how tests put two runtimes
/// ("tabs") on one origin. An optional byte quota makes writes fail the
/// way a full browser store does.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
    quota: Rc<Cell<Option<usize>>>,
}

impl MemoryStore {
    /// Create an empty store without a quota.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store that rejects writes past `bytes` in total.
    pub fn with_quota(bytes: usize) -> Self {
        let store = Self::default();
        store.quota.set(Some(bytes));
        store
    }

    /// Change the quota; `None` removes it.
    pub fn set_quota(&self, bytes: Option<usize>) {
        self.quota.set(bytes);
    }

    /// Number of stored entries.
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn used_bytes_without(&self, key: &str) -> usize {
        self.entries
            .borrow()
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &PersistedKey) -> Result<Option<String>> {
        Ok(self.entries.borrow().get(key.as_str()).cloned())
    }

    fn set(&self, key: &PersistedKey, value: Option<&str>) -> Result<()> {
        match value {
            Some(value) => {
                if let Some(quota) = self.quota.get() {
                    let needed = self.used_bytes_without(key.as_str()) + key.as_str().len() + value.len();
                    if needed > quota {
                        return Err(unavailable(
                            key,
                            format!("quota exceeded ({} of {} bytes)", needed, quota),
                        ));
                    }
                }
                self.entries
                    .borrow_mut()
                    .insert(key.as_str().to_string(), value.to_string());
            }
            None => {
                self.entries.borrow_mut().remove(key.as_str());
            }
        }
        Ok(())
    }
}
