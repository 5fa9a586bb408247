//! Detection of writes made by other contexts.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::{ChangeEvent, ChangeNotifier};
use crate::error::{LiftlogError, Result};
use crate::store::{KeyValueStore, PersistedKey};

/// Per-context view of the shared store that surfaces foreign writes.
///
/// The watcher remembers the last envelope this context saw for each
/// watched key. [`StorageWatcher::poll`] re-reads those keys and publishes
/// a [`ChangeEvent`] for each one whose stored envelope moved. Local writes
/// update the snapshot first, so a context never hears its own writes
/// through this path.
pub struct StorageWatcher {
    store: Rc<dyn KeyValueStore>,
    notifier: ChangeNotifier,
    seen: RefCell<HashMap<PersistedKey, Option<String>>>,
}

impl StorageWatcher {
    /// Create a watcher over `store` publishing on `notifier`.
    pub fn new(store: Rc<dyn KeyValueStore>, notifier: ChangeNotifier) -> Self {
        Self {
            store,
            notifier,
            seen: RefCell::new(HashMap::new()),
        }
    }

    /// Start watching `key`, given the envelope the caller just read.
    ///
    /// Watching an already watched key keeps the older snapshot, so a
    /// pending foreign change is still reported on the next poll.
    pub fn watch(&self, key: &PersistedKey, current: Option<String>) {
        self.seen.borrow_mut().entry(key.clone()).or_insert(current);
    }

    /// Whether `key` is being watched.
    pub fn is_watching(&self, key: &PersistedKey) -> bool {
        self.seen.borrow().contains_key(key)
    }

    /// Record a write made by this context.
    pub fn record_local_write(&self, key: &PersistedKey, value: Option<&str>) {
        let mut seen = self.seen.borrow_mut();
        if let Some(snapshot) = seen.get_mut(key) {
            *snapshot = value.map(String::from);
        }
    }

    /// Compare every watched key with the store and publish what moved.
    ///
    /// Returns the number of events published.
    pub fn poll(&self) -> Result<usize> {
        let keys: Vec<PersistedKey> = self.seen.borrow().keys().cloned().collect();
        let mut published = 0;

        for key in keys {
            let current = match self.store.get(&key) {
                Ok(current) => current,
                Err(LiftlogError::CorruptValue { .. }) => None,
                Err(e) => return Err(e),
            };
            let changed = {
                let mut seen = self.seen.borrow_mut();
                match seen.get_mut(&key) {
                    Some(snapshot) if *snapshot != current => {
                        *snapshot = current.clone();
                        true
                    }
                    _ => false,
                }
            };

            if changed {
                tracing::debug!("Detected foreign write to {}", key);
                self.notifier.publish(ChangeEvent::new(key, current));
                published += 1;
            }
        }

        Ok(published)
    }
}
