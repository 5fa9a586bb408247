//! Wake lock contract and suspension handling.
//!
//! The platform lock itself is an external collaborator behind
//! [`WakeLock`]. [`SuspensionHandler`] remembers whether the user wants the
//! screen kept on and, when the context becomes visible again, reacquires
//! a lock the platform dropped while hidden and brings the rest timer up to
//! date.

use crate::timer::RestTimer;

/// Platform screen wake lock.
pub trait WakeLock {
    fn is_supported(&self) -> bool;

    /// Try to acquire the lock. Returns whether it is now held.
    fn request(&mut self) -> bool;

    /// Release the lock. Returns false when none was held.
    fn release(&mut self) -> bool;

    fn is_active(&self) -> bool;
}

/// Wake lock for platforms without one.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnsupportedWakeLock;

impl WakeLock for UnsupportedWakeLock {
    fn is_supported(&self) -> bool {
        false
    }

    fn request(&mut self) -> bool {
        tracing::warn!("Wake lock is not supported on this platform");
        false
    }

    fn release(&mut self) -> bool {
        false
    }

    fn is_active(&self) -> bool {
        false
    }
}

/// Whether the context is in the foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

/// Keeps the wake lock and the rest timer consistent across suspension.
pub struct SuspensionHandler<L: WakeLock> {
    lock: L,
    wanted: bool,
}

impl<L: WakeLock> SuspensionHandler<L> {
    pub fn new(lock: L) -> Self {
        Self {
            lock,
            wanted: false,
        }
    }

    pub fn is_supported(&self) -> bool {
        self.lock.is_supported()
    }

    pub fn is_active(&self) -> bool {
        self.lock.is_active()
    }

    /// Ask for the screen to stay on.
    pub fn acquire(&mut self) -> bool {
        self.wanted = true;
        let acquired = self.lock.request();
        if acquired {
            tracing::info!("Wake lock acquired");
        }
        acquired
    }

    /// Let the screen sleep again.
    pub fn release(&mut self) -> bool {
        self.wanted = false;
        self.lock.release()
    }

    /// Acquire when inactive, release when active. Returns the new state.
    pub fn toggle(&mut self) -> bool {
        if self.is_active() {
            self.release();
            false
        } else {
            self.acquire()
        }
    }

    /// React to a visibility change.
    ///
    /// On return to the foreground a wanted lock that the platform dropped
    /// is requested again, and the timer is re-evaluated so a rest period
    /// that ran out while hidden completes now.
    pub fn on_visibility(&mut self, visibility: Visibility, timer: Option<&RestTimer>) {
        match visibility {
            Visibility::Hidden => tracing::debug!("Context hidden"),
            Visibility::Visible => {
                if self.wanted && !self.lock.is_active() {
                    tracing::debug!("Reacquiring wake lock after suspension");
                    self.lock.request();
                }
                if let Some(timer) = timer {
                    timer.refresh();
                }
            }
        }
    }

    pub fn lock(&self) -> &L {
        &self.lock
    }
}

impl<L: WakeLock> Drop for SuspensionHandler<L> {
    fn drop(&mut self) {
        if self.lock.is_active() {
            self.lock.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{ManualClock, Runtime};
    use crate::store::MemoryStore;
    use std::cell::Cell;
    use std::rc::Rc;

    #[derive(Default)]
    struct FakeLock {
        held: bool,
        requests: u32,
    }

    impl WakeLock for FakeLock {
        fn is_supported(&self) -> bool {
            true
        }

        fn request(&mut self) -> bool {
            self.requests += 1;
            self.held = true;
            true
        }

        fn release(&mut self) -> bool {
            std::mem::replace(&mut self.held, false)
        }

        fn is_active(&self) -> bool {
            self.held
        }
    }

    #[test]
    fn toggle_acquires_then_releases() {
        let mut handler = SuspensionHandler::new(FakeLock::default());
        assert!(handler.toggle());
        assert!(handler.is_active());
        assert!(!handler.toggle());
        assert!(!handler.is_active());
    }

    #[test]
    fn visible_reacquires_lock_dropped_while_hidden() {
        let mut handler = SuspensionHandler::new(FakeLock::default());
        handler.acquire();

        handler.on_visibility(Visibility::Hidden, None);
        handler.lock.held = false;
        handler.on_visibility(Visibility::Visible, None);

        assert!(handler.is_active());
        assert_eq!(handler.lock().requests, 2);
    }

    #[test]
    fn visible_does_not_acquire_unwanted_lock() {
        let mut handler = SuspensionHandler::new(FakeLock::default());
        handler.on_visibility(Visibility::Visible, None);
        assert!(!handler.is_active());
        assert_eq!(handler.lock().requests, 0);
    }

    #[test]
    fn unsupported_lock_never_activates() {
        let mut handler = SuspensionHandler::new(UnsupportedWakeLock);
        assert!(!handler.is_supported());
        assert!(!handler.acquire());
        assert!(!handler.is_active());
    }

    #[test]
    fn visible_completes_rest_that_ran_out_while_hidden() {
        let clock = ManualClock::new(1_000_000);
        let runtime = Runtime::new(Rc::new(MemoryStore::new()), Rc::new(clock.clone()));
        let rings = Rc::new(Cell::new(0));
        let counter = Rc::clone(&rings);
        let timer = RestTimer::bind(&runtime, move || counter.set(counter.get() + 1)).unwrap();
        let mut handler = SuspensionHandler::new(FakeLock::default());

        timer.start(60).unwrap();
        handler.on_visibility(Visibility::Hidden, Some(&timer));
        clock.advance(90_000);
        handler.on_visibility(Visibility::Visible, Some(&timer));

        assert!(!timer.is_running());
        assert_eq!(rings.get(), 1);
    }
}
