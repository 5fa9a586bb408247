//! Periodic update checks on a context's event loop.

use std::cell::RefCell;
use std::rc::Rc;

use super::version::{UpdateStatus, VersionSource};
use crate::runtime::{EventLoop, Runtime, TimerId};

/// Default interval between checks.
pub const DEFAULT_CHECK_INTERVAL_MS: i64 = 60_000;

type Listener = Box<dyn Fn(&UpdateStatus)>;

struct PollerState {
    source: Box<dyn VersionSource>,
    status: RefCell<UpdateStatus>,
    listener: Listener,
}

/// Checks for a new deployment once on start and then every interval.
///
/// The listener hears every status that differs from the previous one.
pub struct UpdatePoller {
    state: Rc<PollerState>,
    event_loop: EventLoop,
    timer: TimerId,
}

impl UpdatePoller {
    pub fn start(
        runtime: &Runtime,
        source: impl VersionSource + 'static,
        interval_ms: i64,
        listener: impl Fn(&UpdateStatus) + 'static,
    ) -> Self {
        let current = source.current_version().to_string();
        let state = Rc::new(PollerState {
            source: Box::new(source),
            status: RefCell::new(UpdateStatus::up_to_date(&current)),
            listener: Box::new(listener),
        });

        let event_loop = runtime.event_loop().clone();

        let first = Rc::downgrade(&state);
        let clock = event_loop.clone();
        event_loop.defer(move || {
            if let Some(state) = first.upgrade() {
                run_check(&state, clock.now());
            }
        });

        let periodic = Rc::downgrade(&state);
        let clock = event_loop.clone();
        let timer = event_loop.schedule_every(interval_ms, move || {
            if let Some(state) = periodic.upgrade() {
                run_check(&state, clock.now());
            }
        });

        Self {
            state,
            event_loop,
            timer,
        }
    }

    /// The latest status.
    pub fn status(&self) -> UpdateStatus {
        self.state.status.borrow().clone()
    }

    /// Check right away, outside the schedule.
    pub fn check_now(&self) -> UpdateStatus {
        run_check(&self.state, self.event_loop.now());
        self.status()
    }
}

impl Drop for UpdatePoller {
    fn drop(&mut self) {
        self.event_loop.cancel(self.timer);
    }
}

fn run_check(state: &PollerState, now: i64) {
    {
        let mut status = state.status.borrow_mut();
        if status.checking {
            return;
        }
        status.checking = true;
    }

    let next = state.source.check(now);
    let changed = {
        let mut status = state.status.borrow_mut();
        let changed = status.has_update != next.has_update || status.latest_version != next.latest_version;
        *status = next;
        changed
    };

    if changed {
        let status = state.status.borrow().clone();
        tracing::debug!(
            "Update status: latest {} (update: {})",
            status.latest_version,
            status.has_update
        );
        (state.listener)(&status);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualClock;
    use crate::store::MemoryStore;
    use anyhow::anyhow;
    use std::cell::Cell;

    struct Scripted {
        replies: RefCell<Vec<anyhow::Result<String>>>,
        calls: Rc<Cell<u32>>,
    }

    impl Scripted {
        fn new(replies: Vec<anyhow::Result<String>>) -> (Self, Rc<Cell<u32>>) {
            let calls = Rc::new(Cell::new(0));
            let mut replies = replies;
            replies.reverse();
            (
                Self {
                    replies: RefCell::new(replies),
                    calls: Rc::clone(&calls),
                },
                calls,
            )
        }
    }

    impl VersionSource for Scripted {
        fn latest_version(&self, _timestamp_ms: i64) -> anyhow::Result<String> {
            self.calls.set(self.calls.get() + 1);
            self.replies
                .borrow_mut()
                .pop()
                .unwrap_or_else(|| Ok("1.0.0".to_string()))
        }

        fn current_version(&self) -> &str {
            "1.0.0"
        }
    }

    fn runtime(clock: &ManualClock) -> Runtime {
        Runtime::new(Rc::new(MemoryStore::new()), Rc::new(clock.clone()))
    }

    #[test]
    fn checks_on_start_then_every_interval() {
        let clock = ManualClock::new(0);
        let runtime = runtime(&clock);
        let (source, calls) = Scripted::new(vec![]);
        let _poller = UpdatePoller::start(&runtime, source, 60_000, |_| {});

        runtime.run_until_idle();
        assert_eq!(calls.get(), 1);

        clock.advance(60_000);
        runtime.run_until_idle();
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn listener_hears_new_deployment_once() {
        let clock = ManualClock::new(0);
        let runtime = runtime(&clock);
        let (source, _calls) = Scripted::new(vec![
            Ok("1.0.0".into()),
            Ok("1.0.1".into()),
            Ok("1.0.1".into()),
        ]);
        let heard = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&heard);
        let poller = UpdatePoller::start(&runtime, source, 1_000, move |status| {
            sink.borrow_mut().push(status.latest_version.clone())
        });

        runtime.run_until_idle();
        for _ in 0..2 {
            clock.advance(1_000);
            runtime.run_until_idle();
        }

        assert_eq!(*heard.borrow(), vec!["1.0.1".to_string()]);
        assert!(poller.status().has_update);
    }

    #[test]
    fn failed_check_falls_back_to_no_update() {
        let clock = ManualClock::new(0);
        let runtime = runtime(&clock);
        let (source, _calls) = Scripted::new(vec![Ok("2.0.0".into()), Err(anyhow!("offline"))]);
        let poller = UpdatePoller::start(&runtime, source, 1_000, |_| {});

        runtime.run_until_idle();
        assert!(poller.status().has_update);

        let status = poller.check_now();
        assert!(!status.has_update);
        assert!(!status.checking);
    }

    #[test]
    fn dropping_poller_stops_checks() {
        let clock = ManualClock::new(0);
        let runtime = runtime(&clock);
        let (source, calls) = Scripted::new(vec![]);
        let poller = UpdatePoller::start(&runtime, source, 1_000, |_| {});
        runtime.run_until_idle();

        drop(poller);
        clock.advance(5_000);
        runtime.run_until_idle();

        assert_eq!(calls.get(), 1);
        assert_eq!(runtime.event_loop().pending(), 0);
    }
}
