//! Single-threaded cooperative event loop.
//!
//! One loop per execution context. It owns a FIFO queue of deferred tasks
//! and a set of wall-clock timers ordered by due time, ties broken by
//! scheduling order. Deferred tasks always run before due timers within a
//! turn. No borrow of the loop is held while a task runs, so tasks may
//! freely defer, schedule, or cancel.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use super::clock::Clock;

type Task = Box<dyn FnOnce()>;

/// Handle to a scheduled timer, used to cancel it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

enum TimerTask {
    Once(Task),
    Every { period: i64, task: Rc<dyn Fn()> },
}

enum Job {
    Once(Task),
    Repeat(Rc<dyn Fn()>),
}

#[derive(Default)]
struct Queue {
    ready: VecDeque<Task>,
    timers: BTreeMap<(i64, u64), TimerTask>,
    due_by_id: HashMap<u64, i64>,
    next_id: u64,
}

impl Queue {
    fn insert_timer(&mut self, due: i64, id: u64, task: TimerTask) {
        self.timers.insert((due, id), task);
        self.due_by_id.insert(id, due);
    }

    fn take_next(&mut self, now: i64) -> Option<Job> {
        if let Some(task) = self.ready.pop_front() {
            return Some(Job::Once(task));
        }

        let is_due = self
            .timers
            .first_key_value()
            .is_some_and(|(&(due, _), _)| due <= now);
        if !is_due {
            return None;
        }

        let ((_, id), timer) = self.timers.pop_first()?;
        match timer {
            TimerTask::Once(task) => {
                self.due_by_id.remove(&id);
                Some(Job::Once(task))
            }
            TimerTask::Every { period, task } => {
                // Re-arm before running so the task can cancel itself.
                self.insert_timer(
                    now + period,
                    id,
                    TimerTask::Every {
                        period,
                        task: Rc::clone(&task),
                    },
                );
                Some(Job::Repeat(task))
            }
        }
    }
}

/// Cooperative scheduler for one execution context.
///
/// Cloning yields another handle to the same loop.
#[derive(Clone)]
pub struct EventLoop {
    queue: Rc<RefCell<Queue>>,
    clock: Rc<dyn Clock>,
}

impl fmt::Debug for EventLoop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let queue = self.queue.borrow();
        f.debug_struct("EventLoop")
            .field("ready", &queue.ready.len())
            .field("timers", &queue.timers.len())
            .finish()
    }
}

impl EventLoop {
    /// Create an empty loop reading time from `clock`.
    pub fn new(clock: Rc<dyn Clock>) -> Self {
        Self {
            queue: Rc::new(RefCell::new(Queue::default())),
            clock,
        }
    }

    /// Current time in epoch milliseconds.
    pub fn now(&self) -> i64 {
        self.clock.now_millis()
    }

    /// Queue `task` for the next turn of the loop.
    pub fn defer(&self, task: impl FnOnce() + 'static) {
        self.queue.borrow_mut().ready.push_back(Box::new(task));
    }

    /// Run `task` once the clock reaches `due`.
    pub fn schedule_at(&self, due: i64, task: impl FnOnce() + 'static) -> TimerId {
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id;
        queue.next_id += 1;
        queue.insert_timer(due, id, TimerTask::Once(Box::new(task)));
        TimerId(id)
    }

    /// Run `task` after `delay_ms` milliseconds.
    pub fn schedule_in(&self, delay_ms: i64, task: impl FnOnce() + 'static) -> TimerId {
        self.schedule_at(self.now() + delay_ms, task)
    }

    /// Run `task` every `period_ms` milliseconds, starting one period from now.
    pub fn schedule_every(&self, period_ms: i64, task: impl Fn() + 'static) -> TimerId {
        let due = self.now() + period_ms;
        let mut queue = self.queue.borrow_mut();
        let id = queue.next_id;
        queue.next_id += 1;
        queue.insert_timer(
            due,
            id,
            TimerTask::Every {
                period: period_ms,
                task: Rc::new(task),
            },
        );
        TimerId(id)
    }

    /// Cancel a timer. Returns false if it already ran or was cancelled.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut queue = self.queue.borrow_mut();
        match queue.due_by_id.remove(&id.0) {
            Some(due) => queue.timers.remove(&(due, id.0)).is_some(),
            None => false,
        }
    }

    /// Whether a timer is still waiting to run.
    pub fn is_scheduled(&self, id: TimerId) -> bool {
        self.queue.borrow().due_by_id.contains_key(&id.0)
    }

    /// Number of queued tasks plus scheduled timers.
    pub fn pending(&self) -> usize {
        let queue = self.queue.borrow();
        queue.ready.len() + queue.timers.len()
    }

    /// Due time of the earliest timer.
    pub fn next_due(&self) -> Option<i64> {
        self.queue
            .borrow()
            .timers
            .first_key_value()
            .map(|(&(due, _), _)| due)
    }

    /// Run a single ready task. Returns false when nothing was ready.
    pub fn turn(&self) -> bool {
        let now = self.now();
        let job = self.queue.borrow_mut().take_next(now);
        match job {
            Some(Job::Once(task)) => {
                task();
                true
            }
            Some(Job::Repeat(task)) => {
                task();
                true
            }
            None => false,
        }
    }

    /// Run tasks until none is ready at the clock's current time.
    ///
    /// Returns how many tasks ran.
    pub fn run_until_idle(&self) -> usize {
        let mut ran = 0;
        while self.turn() {
            ran += 1;
        }
        ran
    }

    /// Drive the loop in real time for `duration`, sleeping between timers.
    ///
    /// Only meaningful with a clock that advances on its own.
    pub fn run_for(&self, duration: Duration) -> usize {
        let end = self.now() + duration.as_millis() as i64;
        let mut ran = 0;

        loop {
            ran += self.run_until_idle();
            let now = self.now();
            if now >= end {
                break;
            }
            let wake = self.next_due().map_or(end, |due| due.min(end));
            if wake > now {
                std::thread::sleep(Duration::from_millis((wake - now) as u64));
            }
        }

        ran
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::ManualClock;
    use std::cell::RefCell;

    fn setup() -> (ManualClock, EventLoop, Rc<RefCell<Vec<&'static str>>>) {
        let clock = ManualClock::new(0);
        let event_loop = EventLoop::new(Rc::new(clock.clone()));
        (clock, event_loop, Rc::new(RefCell::new(Vec::new())))
    }

    #[test]
    fn deferred_tasks_run_in_order_on_next_turn() {
        let (_clock, event_loop, log) = setup();
        for name in ["a", "b", "c"] {
            let log = Rc::clone(&log);
            event_loop.defer(move || log.borrow_mut().push(name));
        }

        assert!(log.borrow().is_empty());
        assert_eq!(event_loop.run_until_idle(), 3);
        assert_eq!(*log.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn timers_wait_for_the_clock() {
        let (clock, event_loop, log) = setup();
        let late = Rc::clone(&log);
        event_loop.schedule_in(2_000, move || late.borrow_mut().push("late"));
        let early = Rc::clone(&log);
        event_loop.schedule_in(1_000, move || early.borrow_mut().push("early"));

        assert_eq!(event_loop.run_until_idle(), 0);
        assert_eq!(event_loop.next_due(), Some(1_000));

        clock.advance(5_000);
        event_loop.run_until_idle();
        assert_eq!(*log.borrow(), vec!["early", "late"]);
    }

    #[test]
    fn deferred_tasks_run_before_due_timers() {
        let (_clock, event_loop, log) = setup();
        let timer = Rc::clone(&log);
        event_loop.schedule_at(0, move || timer.borrow_mut().push("timer"));
        let deferred = Rc::clone(&log);
        event_loop.defer(move || deferred.borrow_mut().push("deferred"));

        event_loop.run_until_idle();
        assert_eq!(*log.borrow(), vec!["deferred", "timer"]);
    }

    #[test]
    fn cancelled_timer_never_runs() {
        let (clock, event_loop, log) = setup();
        let inner = Rc::clone(&log);
        let id = event_loop.schedule_in(100, move || inner.borrow_mut().push("ran"));

        assert!(event_loop.is_scheduled(id));
        assert!(event_loop.cancel(id));
        assert!(!event_loop.cancel(id));

        clock.advance(1_000);
        event_loop.run_until_idle();
        assert!(log.borrow().is_empty());
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn repeating_timer_rearms_until_cancelled() {
        let (clock, event_loop, _log) = setup();
        let count = Rc::new(std::cell::Cell::new(0));
        let inner = Rc::clone(&count);
        let id = event_loop.schedule_every(500, move || inner.set(inner.get() + 1));

        for _ in 0..3 {
            clock.advance(500);
            event_loop.run_until_idle();
        }
        assert_eq!(count.get(), 3);

        assert!(event_loop.cancel(id));
        clock.advance(500);
        event_loop.run_until_idle();
        assert_eq!(count.get(), 3);
    }

    #[test]
    fn task_may_schedule_from_inside_the_loop() {
        let (_clock, event_loop, log) = setup();
        let handle = event_loop.clone();
        let outer = Rc::clone(&log);
        event_loop.defer(move || {
            outer.borrow_mut().push("outer");
            let inner = Rc::clone(&outer);
            handle.defer(move || inner.borrow_mut().push("inner"));
        });

        event_loop.run_until_idle();
        assert_eq!(*log.borrow(), vec!["outer", "inner"]);
    }
}
