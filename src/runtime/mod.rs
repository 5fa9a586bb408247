//! Execution context: event loop, clock, and the shared services.
//!
//! A [`Runtime`] is one execution context (a terminal session, a `watch`
//! view, a test "tab"). It is constructed once at startup and handed by
//! reference to every binding that needs storage or notification. Several
//! runtimes may share one store; each has its own loop, notifier, and
//! storage watcher.
//!
//! # Example
//!
//! ```
//! use liftlog::runtime::Runtime;
//! use liftlog::store::PersistedKey;
//!
//! let runtime = Runtime::in_memory();
//! let key = PersistedKey::new("demo", "value");
//! runtime.write(&key, Some("42")).unwrap();
//! assert_eq!(runtime.read(&key).unwrap().as_deref(), Some("42"));
//! ```

pub mod clock;
pub mod event_loop;

pub use clock::{Clock, ManualClock, SystemClock};
pub use event_loop::{EventLoop, TimerId};

use std::cell::Cell;
use std::path::PathBuf;
use std::rc::Rc;
use std::time::Duration;

use crate::error::Result;
use crate::notify::{ChangeEvent, ChangeNotifier, StorageWatcher};
use crate::store::{FileStore, KeyValueStore, MemoryStore, PersistedKey};

/// Default interval between storage-watcher polls.
pub const DEFAULT_POLL_INTERVAL_MS: i64 = 500;

/// One execution context and its services.
///
/// Cloning yields another handle to the same context.
#[derive(Clone)]
pub struct Runtime {
    store: Rc<dyn KeyValueStore>,
    event_loop: EventLoop,
    notifier: ChangeNotifier,
    watcher: Rc<StorageWatcher>,
    polling: Rc<Cell<Option<TimerId>>>,
    write_seq: Rc<Cell<u64>>,
}

impl Runtime {
    /// Create a context over `store` reading time from `clock`.
    pub fn new(store: Rc<dyn KeyValueStore>, clock: Rc<dyn Clock>) -> Self {
        let event_loop = EventLoop::new(clock);
        let notifier = ChangeNotifier::new(event_loop.clone());
        let watcher = Rc::new(StorageWatcher::new(Rc::clone(&store), notifier.clone()));

        Self {
            store,
            event_loop,
            notifier,
            watcher,
            polling: Rc::new(Cell::new(None)),
            write_seq: Rc::new(Cell::new(0)),
        }
    }

    /// Context over a directory store and the system clock.
    pub fn with_file_store(root: impl Into<PathBuf>) -> Self {
        Self::new(Rc::new(FileStore::new(root)), Rc::new(SystemClock))
    }

    /// Context over a fresh in-memory store and the system clock.
    pub fn in_memory() -> Self {
        Self::new(Rc::new(MemoryStore::new()), Rc::new(SystemClock))
    }

    /// The shared store.
    pub fn store(&self) -> &Rc<dyn KeyValueStore> {
        &self.store
    }

    /// This context's event loop.
    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    /// This context's notifier.
    pub fn notifier(&self) -> &ChangeNotifier {
        &self.notifier
    }

    /// This context's storage watcher.
    pub fn watcher(&self) -> &StorageWatcher {
        &self.watcher
    }

    /// Current time in epoch milliseconds.
    pub fn now(&self) -> i64 {
        self.event_loop.now()
    }

    /// Read the envelope under `key` straight from the store.
    pub fn read(&self, key: &PersistedKey) -> Result<Option<String>> {
        self.store.get(key)
    }

    /// Write through the store and announce the change.
    ///
    /// The store write happens first; if it fails nothing is published.
    /// Returns the sequence number stamped on the published event. Numbers
    /// increase with every successful write in this context.
    pub fn write(&self, key: &PersistedKey, value: Option<&str>) -> Result<u64> {
        self.store.set(key, value)?;
        self.watcher.record_local_write(key, value);
        let seq = self.write_seq.get() + 1;
        self.write_seq.set(seq);
        self.notifier
            .publish(ChangeEvent::local(key.clone(), value.map(String::from), seq));
        Ok(seq)
    }

    /// Check the store for foreign writes right now.
    pub fn poll_now(&self) -> Result<usize> {
        self.watcher.poll()
    }

    /// Poll the store for foreign writes every `interval_ms`.
    ///
    /// Replaces any polling already running.
    pub fn start_polling(&self, interval_ms: i64) {
        self.stop_polling();
        let watcher = Rc::downgrade(&self.watcher);
        let id = self.event_loop.schedule_every(interval_ms, move || {
            if let Some(watcher) = watcher.upgrade() {
                if let Err(e) = watcher.poll() {
                    tracing::warn!("Storage poll failed: {}", e);
                }
            }
        });
        self.polling.set(Some(id));
    }

    /// Stop periodic polling.
    pub fn stop_polling(&self) {
        if let Some(id) = self.polling.take() {
            self.event_loop.cancel(id);
        }
    }

    /// Whether periodic polling is active.
    pub fn is_polling(&self) -> bool {
        self.polling.get().is_some()
    }

    /// Run every task that is ready now.
    pub fn run_until_idle(&self) -> usize {
        self.event_loop.run_until_idle()
    }

    /// Drive the loop in real time for `duration`.
    pub fn run_for(&self, duration: Duration) -> usize {
        self.event_loop.run_for(duration)
    }

    /// Tear the context down: stop polling and release every subscription.
    pub fn shutdown(&self) {
        self.stop_polling();
        self.notifier.clear();
    }
}
