//! RAII subscription handles.

use std::fmt;

/// Handle returned by every `subscribe`/`watch` call.
///
/// Dropping the handle (or calling [`Subscription::unsubscribe`]) detaches
/// the handler. Keep it alive for as long as the consumer is mounted.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    cancel: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Wrap the detach action.
    pub(crate) fn new(cancel: impl FnOnce() + 'static) -> Self {
        Self {
            cancel: Some(Box::new(cancel)),
        }
    }

    /// A handle with nothing to detach.
    pub fn empty() -> Self {
        Self { cancel: None }
    }

    /// Detach now.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.cancel.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn drop_runs_cancel_once() {
        let calls = Rc::new(Cell::new(0));
        let inner = Rc::clone(&calls);
        let subscription = Subscription::new(move || inner.set(inner.get() + 1));
        drop(subscription);
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn unsubscribe_runs_cancel_once() {
        let calls = Rc::new(Cell::new(0));
        let inner = Rc::clone(&calls);
        Subscription::new(move || inner.set(inner.get() + 1)).unsubscribe();
        assert_eq!(calls.get(), 1);
    }
}
