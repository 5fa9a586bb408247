//! Resumable rest countdown.
//!
//! The timer persists one absolute deadline (epoch milliseconds) and derives
//! everything else from it: `remaining = max(0, round((deadline - now) / 1000))`.
//! Nothing that counts down is ever stored, so a timer rebuilt after a
//! reload, a suspended process, or a second context lands on the same
//! remaining time as one that ran the whole way.
//!
//! States: `Idle` (no deadline stored) and `Running` (deadline stored).
//! Reaching zero on a tick rings the [`Alarm`], clears the deadline, and
//! returns to `Idle`. A deadline found already past on activation is
//! cleared silently. `now == deadline` counts as past.

pub mod alarm;

pub use alarm::{Alarm, SilentAlarm, TerminalBell};

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{LiftlogError, Result};
use crate::notify::Subscription;
use crate::persisted::PersistedValue;
use crate::runtime::{Runtime, TimerId};
use crate::store::PersistedKey;
use crate::workout::NAMESPACE;

/// Default rest period in seconds.
pub const DEFAULT_REST_SECS: u64 = 60;

/// Longest rest period accepted from the command line or config.
pub const MAX_REST_SECS: u64 = 86_400;

/// Interval between ticks while running.
const TICK_MS: i64 = 1_000;

/// Key holding the rest deadline.
pub fn deadline_key() -> PersistedKey {
    PersistedKey::new(NAMESPACE, "restDeadline")
}

/// Observable timer state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    Running { remaining_secs: u64 },
}

impl TimerState {
    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }
}

/// Whole seconds left until `deadline`, rounded to nearest.
pub fn remaining_secs(deadline: i64, now: i64) -> u64 {
    let millis = (deadline - now).max(0);
    (millis as f64 / 1000.0).round() as u64
}

/// Delay until the next whole-second boundary before `deadline`.
///
/// Ticks land on `deadline - k * 1000`, so a late tick shortens the next
/// wait instead of pushing every later tick back.
fn next_tick_delay(deadline: i64, now: i64) -> i64 {
    match (deadline - now).rem_euclid(TICK_MS) {
        0 => TICK_MS,
        offset => offset,
    }
}

#[derive(Default)]
struct Progress {
    active_deadline: Option<i64>,
    pending: Option<TimerId>,
    generation: u64,
}

struct TimerCore {
    runtime: Runtime,
    deadline: PersistedValue<Option<i64>>,
    progress: RefCell<Progress>,
    alarm: Box<dyn Alarm>,
}

impl TimerCore {
    /// Invalidate any scheduled tick and return the new generation.
    fn invalidate(&self, progress: &mut Progress) -> u64 {
        if let Some(id) = progress.pending.take() {
            self.runtime.event_loop().cancel(id);
        }
        progress.generation += 1;
        progress.generation
    }

    fn go_idle(&self) {
        let mut progress = self.progress.borrow_mut();
        self.invalidate(&mut progress);
        progress.active_deadline = None;
    }
}

fn begin(core: &Rc<TimerCore>, deadline: i64) {
    let now = core.runtime.now();
    let generation = {
        let mut progress = core.progress.borrow_mut();
        let generation = core.invalidate(&mut progress);
        progress.active_deadline = Some(deadline);
        generation
    };
    tracing::debug!("Rest running, {}s left", remaining_secs(deadline, now));
    schedule_tick(core, deadline, now, generation);
}

fn schedule_tick(core: &Rc<TimerCore>, deadline: i64, now: i64, generation: u64) {
    let weak = Rc::downgrade(core);
    let id = core
        .runtime
        .event_loop()
        .schedule_in(next_tick_delay(deadline, now), move || {
            if let Some(core) = weak.upgrade() {
                tick(&core, generation);
            }
        });
    core.progress.borrow_mut().pending = Some(id);
}

fn tick(core: &Rc<TimerCore>, generation: u64) {
    let deadline = {
        let mut progress = core.progress.borrow_mut();
        if progress.generation != generation {
            return;
        }
        progress.pending = None;
        match progress.active_deadline {
            Some(deadline) => deadline,
            None => return,
        }
    };

    let now = core.runtime.now();
    if remaining_secs(deadline, now) == 0 {
        tracing::info!("Rest period complete");
        core.go_idle();
        core.alarm.ring();
        if let Err(e) = core.deadline.set(None) {
            tracing::warn!("Could not clear rest deadline: {}", e);
        }
    } else {
        schedule_tick(core, deadline, now, generation);
    }
}

/// Follow a deadline written or removed by another context.
fn adopt_stored(core: &Rc<TimerCore>) {
    let stored = match core.runtime.read(core.deadline.key()) {
        Ok(raw) => raw.and_then(|raw| serde_json::from_str::<i64>(&raw).ok()),
        Err(e) => {
            tracing::warn!("Could not read rest deadline: {}", e);
            return;
        }
    };

    if stored == core.progress.borrow().active_deadline {
        return;
    }

    match stored {
        Some(deadline) if core.runtime.now() < deadline => begin(core, deadline),
        _ => core.go_idle(),
    }
}

/// Countdown timer whose deadline lives in the shared store.
pub struct RestTimer {
    core: Rc<TimerCore>,
    _follow: Subscription,
}

impl RestTimer {
    /// Bind the default deadline key and resume from whatever is stored.
    pub fn bind(runtime: &Runtime, alarm: impl Alarm + 'static) -> Result<Self> {
        Self::with_key(runtime, deadline_key(), alarm)
    }

    /// Bind `key` and resume from whatever is stored there.
    pub fn with_key(runtime: &Runtime, key: PersistedKey, alarm: impl Alarm + 'static) -> Result<Self> {
        let deadline = PersistedValue::<Option<i64>>::bind(runtime, key, None)?;
        let core = Rc::new(TimerCore {
            runtime: runtime.clone(),
            deadline,
            progress: RefCell::new(Progress::default()),
            alarm: Box::new(alarm),
        });

        let weak = Rc::downgrade(&core);
        let follow = core.deadline.watch(move |_| {
            if let Some(core) = weak.upgrade() {
                adopt_stored(&core);
            }
        });

        let timer = Self {
            core,
            _follow: follow,
        };
        timer.resume()?;
        Ok(timer)
    }

    /// Current state, derived from the deadline and the clock.
    pub fn state(&self) -> TimerState {
        match self.core.progress.borrow().active_deadline {
            Some(deadline) => TimerState::Running {
                remaining_secs: remaining_secs(deadline, self.core.runtime.now()),
            },
            None => TimerState::Idle,
        }
    }

    pub fn is_running(&self) -> bool {
        self.core.progress.borrow().active_deadline.is_some()
    }

    /// Seconds left, zero when idle.
    pub fn remaining_secs(&self) -> u64 {
        match self.state() {
            TimerState::Running { remaining_secs } => remaining_secs,
            TimerState::Idle => 0,
        }
    }

    /// The active deadline in epoch milliseconds.
    pub fn deadline(&self) -> Option<i64> {
        self.core.progress.borrow().active_deadline
    }

    /// Start a rest period of `duration_secs`, replacing any running one.
    ///
    /// Fails with [`LiftlogError::InvalidDuration`] when the deadline would
    /// not fit in epoch milliseconds.
    pub fn start(&self, duration_secs: u64) -> Result<()> {
        let deadline = i64::try_from(duration_secs)
            .ok()
            .and_then(|secs| secs.checked_mul(1_000))
            .and_then(|millis| self.core.runtime.now().checked_add(millis))
            .ok_or(LiftlogError::InvalidDuration { secs: duration_secs })?;
        self.core.deadline.set(Some(deadline))?;
        begin(&self.core, deadline);
        Ok(())
    }

    /// Stop the rest period without ringing.
    pub fn stop(&self) -> Result<()> {
        self.core.deadline.set(None)?;
        self.core.go_idle();
        Ok(())
    }

    /// Stop when running, start otherwise.
    pub fn toggle(&self, duration_secs: u64) -> Result<TimerState> {
        if self.is_running() {
            self.stop()?;
        } else {
            self.start(duration_secs)?;
        }
        Ok(self.state())
    }

    /// Rebuild the state from the stored deadline.
    ///
    /// A future deadline resumes ticking; a past one is cleared without
    /// ringing; a missing or unreadable one leaves the timer idle.
    pub fn resume(&self) -> Result<TimerState> {
        let now = self.core.runtime.now();
        match self.core.deadline.get() {
            Some(deadline) if now < deadline => begin(&self.core, deadline),
            Some(_) => {
                tracing::info!("Rest period ended while away; clearing it");
                self.core.go_idle();
                self.core.deadline.set(None)?;
            }
            None => self.core.go_idle(),
        }
        Ok(self.state())
    }

    /// Re-evaluate immediately, e.g. after the process was suspended.
    ///
    /// Unlike [`RestTimer::resume`] this rings if the period ran out.
    pub fn refresh(&self) {
        let generation = {
            let mut progress = self.core.progress.borrow_mut();
            if progress.active_deadline.is_none() {
                return;
            }
            self.core.invalidate(&mut progress)
        };
        tick(&self.core, generation);
    }
}

impl Drop for RestTimer {
    fn drop(&mut self) {
        let mut progress = self.core.progress.borrow_mut();
        self.core.invalidate(&mut progress);
    }
}
