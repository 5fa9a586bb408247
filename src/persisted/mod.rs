//! Reactive values bound to a persisted key.
//!
//! [`PersistedValue`] keeps an in-memory value in step with one key of the
//! shared store:
//!
//! - On bind it reads the store; when nothing is stored it materializes the
//!   initial value (lazily, once) without writing it back
//! - Every `set`/`update` serializes, writes through the store, and
//!   publishes a change event, even when the value did not change
//! - Events for the key (from this context or, via the storage watcher,
//!   from others) replace the in-memory value; deletion resets it to
//!   `T::default()`
//! - An event from this context older than the binding's own last write
//!   still reaches watchers but leaves the newer in-memory value alone
//! - Malformed JSON, stored or incoming, is logged and treated as absent
//!
//! # Example
//!
//! ```
//! use liftlog::persisted::PersistedValue;
//! use liftlog::runtime::Runtime;
//! use liftlog::store::PersistedKey;
//!
//! let runtime = Runtime::in_memory();
//! let key = PersistedKey::new("demo", "count");
//! let counter = PersistedValue::<u32>::bind(&runtime, key.clone(), 0).unwrap();
//!
//! counter.update(|n| n + 1).unwrap();
//! counter.update(|n| n + 1).unwrap();
//!
//! assert_eq!(counter.get(), 2);
//! assert_eq!(runtime.read(&key).unwrap().as_deref(), Some("2"));
//! ```

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::error::{LiftlogError, Result};
use crate::notify::{ChangeEvent, Subscription};
use crate::runtime::Runtime;
use crate::store::PersistedKey;

/// Initial value for a binding: given directly or computed on demand.
pub enum Initial<T> {
    Value(T),
    Lazy(Box<dyn FnOnce() -> T>),
}

impl<T> Initial<T> {
    /// Compute the initial value only if nothing is stored.
    pub fn lazy(f: impl FnOnce() -> T + 'static) -> Self {
        Self::Lazy(Box::new(f))
    }

    fn materialize(self) -> T {
        match self {
            Self::Value(value) => value,
            Self::Lazy(f) => f(),
        }
    }
}

impl<T> From<T> for Initial<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

type Watcher<T> = Rc<dyn Fn(&T)>;

struct Shared<T> {
    value: T,
    watchers: Vec<(u64, Watcher<T>)>,
    next_watcher: u64,
    last_write: Option<u64>,
}

/// An in-memory value mirrored to one persisted key.
///
/// The binding stays subscribed to its key until it is dropped.
pub struct PersistedValue<T> {
    key: PersistedKey,
    runtime: Runtime,
    shared: Rc<RefCell<Shared<T>>>,
    _subscription: Subscription,
}

impl<T> fmt::Debug for PersistedValue<T>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedValue")
            .field("key", &self.key)
            .field("value", &self.shared.borrow().value)
            .finish()
    }
}

impl<T> PersistedValue<T>
where
    T: Serialize + DeserializeOwned + Clone + Default + 'static,
{
    /// Bind `key` in `runtime`.
    ///
    /// Fails only when the store itself cannot be read. An unreadable
    /// envelope is logged and treated as absent.
    pub fn bind(runtime: &Runtime, key: PersistedKey, initial: impl Into<Initial<T>>) -> Result<Self> {
        let stored = match runtime.read(&key) {
            Ok(stored) => stored,
            Err(fault @ LiftlogError::CorruptValue { .. }) => {
                tracing::warn!("{}; treating it as absent", fault);
                None
            }
            Err(e) => return Err(e),
        };
        let decoded = stored.as_deref().and_then(|raw| decode::<T>(&key, raw));
        let value = match decoded {
            Some(value) => value,
            None => initial.into().materialize(),
        };

        runtime.watcher().watch(&key, stored);

        let shared = Rc::new(RefCell::new(Shared {
            value,
            watchers: Vec::new(),
            next_watcher: 0,
            last_write: None,
        }));

        let weak = Rc::downgrade(&shared);
        let subscription = runtime
            .notifier()
            .subscribe(&key, move |event| apply_event(&weak, event));

        Ok(Self {
            key,
            runtime: runtime.clone(),
            shared,
            _subscription: subscription,
        })
    }

    /// The bound key.
    pub fn key(&self) -> &PersistedKey {
        &self.key
    }

    /// A copy of the current value.
    pub fn get(&self) -> T {
        self.shared.borrow().value.clone()
    }

    /// Read the current value without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.shared.borrow().value)
    }

    /// Replace the value.
    pub fn set(&self, next: T) -> Result<()> {
        self.update(move |_| next)
    }

    /// Compute the next value from the latest in-memory value and persist it.
    ///
    /// On a storage fault the in-memory value is left unchanged.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> Result<()> {
        let next = f(&self.shared.borrow().value);
        let encoded = encode(&self.key, &next)?;
        let seq = self.runtime.write(&self.key, encoded.as_deref())?;
        let mut shared = self.shared.borrow_mut();
        shared.value = next;
        shared.last_write = Some(seq);
        Ok(())
    }

    /// Call `f` after every change delivered to this binding.
    pub fn watch(&self, f: impl Fn(&T) + 'static) -> Subscription {
        let id = {
            let mut shared = self.shared.borrow_mut();
            let id = shared.next_watcher;
            shared.next_watcher += 1;
            shared.watchers.push((id, Rc::new(f)));
            id
        };

        let weak: Weak<RefCell<Shared<T>>> = Rc::downgrade(&self.shared);
        Subscription::new(move || {
            if let Some(shared) = weak.upgrade() {
                shared.borrow_mut().watchers.retain(|(w, _)| *w != id);
            }
        })
    }
}

fn apply_event<T>(shared: &Weak<RefCell<Shared<T>>>, event: &ChangeEvent)
where
    T: DeserializeOwned + Clone + Default,
{
    let Some(shared) = shared.upgrade() else {
        return;
    };

    let (next, watchers) = {
        let mut shared = shared.borrow_mut();
        let stale = matches!((event.seq, shared.last_write), (Some(seq), Some(last)) if seq < last);
        if stale {
            tracing::debug!("Skipping superseded write to {}", event.key);
        } else {
            shared.value = event
                .value
                .as_deref()
                .and_then(|raw| decode::<T>(&event.key, raw))
                .unwrap_or_default();
        }
        let watchers: Vec<Watcher<T>> = shared.watchers.iter().map(|(_, w)| Rc::clone(w)).collect();
        (shared.value.clone(), watchers)
    };

    for watcher in watchers {
        watcher(&next);
    }
}

/// Decode a stored envelope, logging and discarding corrupt ones.
fn decode<T: DeserializeOwned>(key: &PersistedKey, raw: &str) -> Option<T> {
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            let fault = LiftlogError::CorruptValue {
                key: key.to_string(),
                message: e.to_string(),
            };
            tracing::warn!("{}; treating it as absent", fault);
            None
        }
    }
}

/// Encode a value; JSON `null` is stored as absence.
fn encode<T: Serialize>(key: &PersistedKey, value: &T) -> Result<Option<String>> {
    let json = serde_json::to_string(value).map_err(|e| LiftlogError::CorruptValue {
        key: key.to_string(),
        message: e.to_string(),
    })?;
    Ok(if json == "null" { None } else { Some(json) })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualClock;
    use crate::store::{KeyValueStore, MemoryStore};
    use std::cell::Cell;

    fn key() -> PersistedKey {
        PersistedKey::new("test", "value")
    }

    fn runtime_over(store: &MemoryStore) -> Runtime {
        Runtime::new(Rc::new(store.clone()), Rc::new(ManualClock::new(0)))
    }

    #[test]
    fn bind_reads_stored_value() {
        let store = MemoryStore::new();
        store.set(&key(), Some("[1,2,3]")).unwrap();
        let runtime = runtime_over(&store);

        let value = PersistedValue::<Vec<u32>>::bind(&runtime, key(), Vec::new()).unwrap();

        assert_eq!(value.get(), vec![1, 2, 3]);
    }

    #[test]
    fn initial_is_lazy_and_not_written_back() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);

        let value = PersistedValue::<Vec<u32>>::bind(
            &runtime,
            key(),
            Initial::lazy(move || {
                counter.set(counter.get() + 1);
                vec![7]
            }),
        )
        .unwrap();

        assert_eq!(value.get(), vec![7]);
        assert_eq!(calls.get(), 1);
        assert_eq!(store.get(&key()).unwrap(), None);
    }

    #[test]
    fn lazy_initial_skipped_when_value_stored() {
        let store = MemoryStore::new();
        store.set(&key(), Some("[1]")).unwrap();
        let runtime = runtime_over(&store);
        let called = Rc::new(Cell::new(false));
        let flag = Rc::clone(&called);

        let _value = PersistedValue::<Vec<u32>>::bind(
            &runtime,
            key(),
            Initial::lazy(move || {
                flag.set(true);
                Vec::new()
            }),
        )
        .unwrap();

        assert!(!called.get());
    }

    #[test]
    fn corrupt_stored_value_falls_back_to_initial() {
        let store = MemoryStore::new();
        store.set(&key(), Some("{not json")).unwrap();
        let runtime = runtime_over(&store);

        let value = PersistedValue::<Vec<u32>>::bind(&runtime, key(), vec![9]).unwrap();

        assert_eq!(value.get(), vec![9]);
    }

    #[test]
    fn updates_fold_in_call_order() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let value = PersistedValue::<i64>::bind(&runtime, key(), 1).unwrap();

        value.update(|n| n + 4).unwrap();
        value.update(|n| n * 3).unwrap();
        value.set(100).unwrap();
        value.update(|n| n - 1).unwrap();
        runtime.run_until_idle();

        assert_eq!(value.get(), 99);
        assert_eq!(store.get(&key()).unwrap().as_deref(), Some("99"));
    }

    #[test]
    fn own_echo_does_not_roll_back_a_later_write() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let value = PersistedValue::<i64>::bind(&runtime, key(), 0).unwrap();

        value.set(1).unwrap();
        value.set(2).unwrap();
        runtime.event_loop().turn();
        value.update(|n| n + 10).unwrap();
        runtime.run_until_idle();

        assert_eq!(value.get(), 12);
        assert_eq!(store.get(&key()).unwrap().as_deref(), Some("12"));
    }

    #[test]
    fn sibling_write_after_own_write_still_applies() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let first = PersistedValue::<i64>::bind(&runtime, key(), 0).unwrap();
        let second = PersistedValue::<i64>::bind(&runtime, key(), 0).unwrap();

        first.set(1).unwrap();
        second.set(7).unwrap();
        runtime.run_until_idle();

        assert_eq!(first.get(), 7);
        assert_eq!(second.get(), 7);
    }

    #[test]
    fn every_write_publishes_even_when_unchanged() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let value = PersistedValue::<i64>::bind(&runtime, key(), 5).unwrap();
        let events = Rc::new(Cell::new(0));
        let counter = Rc::clone(&events);
        let _watch = value.watch(move |_| counter.set(counter.get() + 1));

        value.set(5).unwrap();
        value.set(5).unwrap();
        runtime.run_until_idle();

        assert_eq!(events.get(), 2);
    }

    #[test]
    fn null_is_stored_as_absence() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let value = PersistedValue::<Option<i64>>::bind(&runtime, key(), None).unwrap();

        value.set(Some(1)).unwrap();
        assert_eq!(store.get(&key()).unwrap().as_deref(), Some("1"));

        value.set(None).unwrap();
        assert_eq!(store.get(&key()).unwrap(), None);
    }

    #[test]
    fn sibling_binding_in_same_context_converges() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let writer = PersistedValue::<Vec<u32>>::bind(&runtime, key(), Vec::new()).unwrap();
        let reader = PersistedValue::<Vec<u32>>::bind(&runtime, key(), Vec::new()).unwrap();

        writer.set(vec![4, 2]).unwrap();
        assert!(reader.get().is_empty());

        runtime.run_until_idle();
        assert_eq!(reader.get(), vec![4, 2]);
    }

    #[test]
    fn deletion_event_resets_to_default() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let value = PersistedValue::<Vec<u32>>::bind(&runtime, key(), vec![1]).unwrap();

        runtime.write(&key(), None).unwrap();
        runtime.run_until_idle();

        assert!(value.get().is_empty());
    }

    #[test]
    fn corrupt_event_is_treated_as_absent() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let value = PersistedValue::<Vec<u32>>::bind(&runtime, key(), vec![1]).unwrap();

        runtime.write(&key(), Some("][")).unwrap();
        runtime.run_until_idle();

        assert!(value.get().is_empty());
    }

    #[test]
    fn storage_fault_propagates_and_keeps_value() {
        let store = MemoryStore::with_quota(16);
        let runtime = runtime_over(&store);
        let value = PersistedValue::<String>::bind(&runtime, key(), String::new()).unwrap();

        let err = value.set("x".repeat(100)).unwrap_err();

        assert!(matches!(err, LiftlogError::StorageUnavailable { .. }));
        assert_eq!(value.get(), "");
    }

    #[test]
    fn dropped_binding_unsubscribes() {
        let store = MemoryStore::new();
        let runtime = runtime_over(&store);
        let value = PersistedValue::<i64>::bind(&runtime, key(), 0).unwrap();
        assert_eq!(runtime.notifier().subscriber_count(&key()), 1);

        drop(value);

        assert_eq!(runtime.notifier().subscriber_count(&key()), 0);
    }

    #[test]
    fn other_context_observes_write_after_poll() {
        let store = MemoryStore::new();
        let clock = ManualClock::new(0);
        let tab_a = Runtime::new(Rc::new(store.clone()), Rc::new(clock.clone()));
        let tab_b = Runtime::new(Rc::new(store.clone()), Rc::new(clock.clone()));
        let in_a = PersistedValue::<Vec<u32>>::bind(&tab_a, key(), Vec::new()).unwrap();
        let in_b = PersistedValue::<Vec<u32>>::bind(&tab_b, key(), Vec::new()).unwrap();

        in_a.set(vec![1]).unwrap();
        tab_a.run_until_idle();
        assert!(in_b.get().is_empty());

        tab_b.poll_now().unwrap();
        tab_b.run_until_idle();
        assert_eq!(in_b.get(), vec![1]);

        // The writer never hears its own write back through the watcher.
        assert_eq!(tab_a.poll_now().unwrap(), 0);
    }
}
