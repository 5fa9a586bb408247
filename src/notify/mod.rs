//! Change notification for persisted keys.
//!
//! [`ChangeNotifier`] delivers [`ChangeEvent`]s to every binding of a key
//! inside the current context. Delivery is deferred to the next turn of
//! the [`EventLoop`], so publishing never re-enters a subscriber while the
//! publisher is still mid-update.
//!
//! Other contexts sharing the same store do not hear these events. They
//! learn about writes through their own [`StorageWatcher`], which plays the
//! part of the platform's native storage signal: it fires only for writes
//! made somewhere else.

pub mod subscription;
pub mod watcher;

pub use subscription::Subscription;
pub use watcher::StorageWatcher;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::runtime::EventLoop;
use crate::store::PersistedKey;

/// A committed write to one key. `value == None` means the key was removed.
///
/// Writes made by this context carry the sequence number the runtime gave
/// them; writes surfaced by the storage watcher carry none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub key: PersistedKey,
    pub value: Option<String>,
    pub seq: Option<u64>,
}

impl ChangeEvent {
    /// Create an event for a write made somewhere else.
    pub fn new(key: PersistedKey, value: Option<String>) -> Self {
        Self {
            key,
            value,
            seq: None,
        }
    }

    /// Create an event for write number `seq` of this context.
    pub fn local(key: PersistedKey, value: Option<String>, seq: u64) -> Self {
        Self {
            key,
            value,
            seq: Some(seq),
        }
    }

    /// Whether this event signals deletion.
    pub fn is_deletion(&self) -> bool {
        self.value.is_none()
    }
}

type Handler = Rc<dyn Fn(&ChangeEvent)>;

#[derive(Default)]
struct Registry {
    handlers: HashMap<PersistedKey, Vec<(u64, Handler)>>,
    next_id: u64,
}

impl Registry {
    fn remove(&mut self, key: &PersistedKey, id: u64) {
        if let Some(list) = self.handlers.get_mut(key) {
            list.retain(|(handler_id, _)| *handler_id != id);
            if list.is_empty() {
                self.handlers.remove(key);
            }
        }
    }

    fn contains(&self, key: &PersistedKey, id: u64) -> bool {
        self.handlers
            .get(key)
            .is_some_and(|list| list.iter().any(|(handler_id, _)| *handler_id == id))
    }
}

/// Publish/subscribe hub for one execution context.
#[derive(Clone)]
pub struct ChangeNotifier {
    registry: Rc<RefCell<Registry>>,
    event_loop: EventLoop,
}

impl ChangeNotifier {
    /// Create a notifier delivering on `event_loop`.
    pub fn new(event_loop: EventLoop) -> Self {
        Self {
            registry: Rc::new(RefCell::new(Registry::default())),
            event_loop,
        }
    }

    /// Register `handler` for events on `key`.
    pub fn subscribe(
        &self,
        key: &PersistedKey,
        handler: impl Fn(&ChangeEvent) + 'static,
    ) -> Subscription {
        let id = {
            let mut registry = self.registry.borrow_mut();
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .handlers
                .entry(key.clone())
                .or_default()
                .push((id, Rc::new(handler)));
            id
        };

        let weak: Weak<RefCell<Registry>> = Rc::downgrade(&self.registry);
        let key = key.clone();
        Subscription::new(move || {
            if let Some(registry) = weak.upgrade() {
                registry.borrow_mut().remove(&key, id);
            }
        })
    }

    /// Queue `event` for delivery on the next turn of the loop.
    pub fn publish(&self, event: ChangeEvent) {
        tracing::debug!(
            "Publishing change for {} ({})",
            event.key,
            if event.is_deletion() { "removed" } else { "written" }
        );
        let registry = Rc::downgrade(&self.registry);
        self.event_loop.defer(move || {
            if let Some(registry) = registry.upgrade() {
                deliver(&registry, &event);
            }
        });
    }

    /// Number of live handlers for `key`.
    pub fn subscriber_count(&self, key: &PersistedKey) -> usize {
        self.registry
            .borrow()
            .handlers
            .get(key)
            .map_or(0, Vec::len)
    }

    /// Drop every handler. Used when the context is torn down.
    pub fn clear(&self) {
        self.registry.borrow_mut().handlers.clear();
    }
}

/// Invoke the handlers registered for the event's key at delivery time.
fn deliver(registry: &Rc<RefCell<Registry>>, event: &ChangeEvent) {
    let handlers: Vec<(u64, Handler)> = registry
        .borrow()
        .handlers
        .get(&event.key)
        .map(|list| list.iter().map(|(id, h)| (*id, Rc::clone(h))).collect())
        .unwrap_or_default();

    for (id, handler) in handlers {
        // An earlier handler may have unsubscribed this one.
        if registry.borrow().contains(&event.key, id) {
            handler(event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualClock;
    use std::cell::RefCell;

    fn setup() -> (EventLoop, ChangeNotifier) {
        let event_loop = EventLoop::new(Rc::new(ManualClock::new(0)));
        let notifier = ChangeNotifier::new(event_loop.clone());
        (event_loop, notifier)
    }

    fn key(name: &str) -> PersistedKey {
        PersistedKey::new("test", name)
    }

    fn recorder() -> (Rc<RefCell<Vec<Option<String>>>>, impl Fn(&ChangeEvent) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let inner = Rc::clone(&seen);
        (seen, move |event: &ChangeEvent| {
            inner.borrow_mut().push(event.value.clone())
        })
    }

    #[test]
    fn delivery_is_deferred_to_next_turn() {
        let (event_loop, notifier) = setup();
        let (seen, handler) = recorder();
        let _sub = notifier.subscribe(&key("a"), handler);

        notifier.publish(ChangeEvent::new(key("a"), Some("1".into())));
        assert!(seen.borrow().is_empty());

        event_loop.run_until_idle();
        assert_eq!(*seen.borrow(), vec![Some("1".to_string())]);
    }

    #[test]
    fn events_arrive_in_publish_order() {
        let (event_loop, notifier) = setup();
        let (seen, handler) = recorder();
        let _sub = notifier.subscribe(&key("a"), handler);

        notifier.publish(ChangeEvent::new(key("a"), Some("1".into())));
        notifier.publish(ChangeEvent::new(key("a"), None));
        notifier.publish(ChangeEvent::new(key("a"), Some("2".into())));
        event_loop.run_until_idle();

        assert_eq!(
            *seen.borrow(),
            vec![Some("1".to_string()), None, Some("2".to_string())]
        );
    }

    #[test]
    fn only_matching_key_is_notified() {
        let (event_loop, notifier) = setup();
        let (seen, handler) = recorder();
        let _sub = notifier.subscribe(&key("a"), handler);

        notifier.publish(ChangeEvent::new(key("b"), Some("1".into())));
        event_loop.run_until_idle();

        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn every_subscriber_of_a_key_is_notified() {
        let (event_loop, notifier) = setup();
        let (first, first_handler) = recorder();
        let (second, second_handler) = recorder();
        let _a = notifier.subscribe(&key("a"), first_handler);
        let _b = notifier.subscribe(&key("a"), second_handler);
        assert_eq!(notifier.subscriber_count(&key("a")), 2);

        notifier.publish(ChangeEvent::new(key("a"), Some("1".into())));
        event_loop.run_until_idle();

        assert_eq!(first.borrow().len(), 1);
        assert_eq!(second.borrow().len(), 1);
    }

    #[test]
    fn unsubscribe_before_delivery_skips_handler() {
        let (event_loop, notifier) = setup();
        let (seen, handler) = recorder();
        let sub = notifier.subscribe(&key("a"), handler);

        notifier.publish(ChangeEvent::new(key("a"), Some("1".into())));
        sub.unsubscribe();
        event_loop.run_until_idle();

        assert!(seen.borrow().is_empty());
        assert_eq!(notifier.subscriber_count(&key("a")), 0);
    }

    #[test]
    fn dropping_subscription_detaches() {
        let (_event_loop, notifier) = setup();
        {
            let (_seen, handler) = recorder();
            let _sub = notifier.subscribe(&key("a"), handler);
            assert_eq!(notifier.subscriber_count(&key("a")), 1);
        }
        assert_eq!(notifier.subscriber_count(&key("a")), 0);
    }

    #[test]
    fn handler_may_publish_during_delivery() {
        let (event_loop, notifier) = setup();
        let (seen, handler) = recorder();
        let _sink = notifier.subscribe(&key("b"), handler);

        let relay = notifier.clone();
        let _relay = notifier.subscribe(&key("a"), move |event| {
            relay.publish(ChangeEvent::new(key("b"), event.value.clone()));
        });

        notifier.publish(ChangeEvent::new(key("a"), Some("x".into())));
        event_loop.run_until_idle();

        assert_eq!(*seen.borrow(), vec![Some("x".to_string())]);
    }
}
