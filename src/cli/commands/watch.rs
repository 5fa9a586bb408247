//! Watch command implementation.
//!
//! The `liftlog watch` command is the long-running view: it re-renders the
//! workout when another session changes it, follows the shared rest timer
//! with a countdown, polls for new deployments, and optionally holds a
//! screen wake lock.

use std::cell::{Cell, RefCell};
use std::rc::Rc;
use std::time::Duration;

use crate::cli::args::WatchArgs;
use crate::config::LiftlogConfig;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::timer::RestTimer;
use crate::ui::{CountdownHandle, UserInterface};
use crate::updates::{UpdateChecker, UpdatePoller, UpdateStatus};
use crate::wake::{SuspensionHandler, UnsupportedWakeLock, Visibility};
use crate::workout::WorkoutLog;

use super::dispatcher::{Command, CommandResult};
use super::display;
use super::rest::{tracking_alarm, FRAME_MS};

/// A frame that overran by this much means the process was suspended.
const SUSPEND_GAP_MS: i64 = 2_000;

/// Countdown currently on screen and the deadline it shows.
struct ShownRest {
    deadline: i64,
    handle: Box<dyn CountdownHandle>,
}

/// The watch command implementation.
pub struct WatchCommand {
    runtime: Runtime,
    config: LiftlogConfig,
    args: WatchArgs,
}

impl WatchCommand {
    /// Create a new watch command.
    pub fn new(runtime: &Runtime, config: &LiftlogConfig, args: WatchArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            config: config.clone(),
            args,
        }
    }

    fn start_update_poller(&self, slot: &Rc<RefCell<Option<UpdateStatus>>>) -> Result<Option<UpdatePoller>> {
        let Some(url) = &self.config.update_url else {
            return Ok(None);
        };

        let checker = UpdateChecker::new(url.as_str())?;
        let slot = Rc::clone(slot);
        let poller = UpdatePoller::start(
            &self.runtime,
            checker,
            secs_to_millis(self.config.update_interval_secs),
            move |status| {
                slot.replace(Some(status.clone()));
            },
        );
        Ok(Some(poller))
    }
}

impl Command for WatchCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let theme = display::theme();
        let log = WorkoutLog::bind(&self.runtime)?;
        let (alarm, rang) = tracking_alarm(self.config.bell && !self.args.no_bell);
        let timer = RestTimer::bind(&self.runtime, alarm)?;

        let dirty = Rc::new(Cell::new(false));
        let _log_watch = {
            let dirty = Rc::clone(&dirty);
            log.watch(move |_| dirty.set(true))
        };

        let update_slot = Rc::new(RefCell::new(None));
        let _poller = self.start_update_poller(&update_slot)?;

        let mut wake = SuspensionHandler::new(UnsupportedWakeLock);
        if self.args.keep_awake && !wake.acquire() {
            ui.warning("Keeping the screen awake is not supported here");
        }

        self.runtime.start_polling(self.config.poll_interval_ms as i64);

        ui.show_header("liftlog watch");
        ui.emit(&display::render_workout(&log.exercises(), &theme));

        let end = self
            .args
            .duration
            .map(|secs| self.runtime.now().saturating_add(secs_to_millis(secs)));
        let mut shown: Option<ShownRest> = None;

        loop {
            let before = self.runtime.now();
            self.runtime.run_for(Duration::from_millis(FRAME_MS));
            let after = self.runtime.now();

            if after - before > FRAME_MS as i64 + SUSPEND_GAP_MS {
                tracing::debug!("Resumed after {}ms away", after - before);
                wake.on_visibility(Visibility::Hidden, None);
                wake.on_visibility(Visibility::Visible, Some(&timer));
            }

            if dirty.replace(false) {
                ui.emit("");
                ui.emit(&display::render_workout(&log.exercises(), &theme));
            }

            if let Some(status) = update_slot.borrow_mut().take() {
                if status.has_update {
                    ui.warning(&format!(
                        "Version {} is available (running {})",
                        status.latest_version, status.current_version
                    ));
                }
            }

            shown = follow_rest(ui, &timer, &rang, shown);

            if end.is_some_and(|end| self.runtime.now() >= end) {
                break;
            }
        }

        if let Some(mut rest) = shown {
            rest.handle.cancel("Stopped watching");
        }
        self.runtime.stop_polling();
        wake.release();

        Ok(CommandResult::success())
    }
}

/// Seconds to milliseconds, saturating instead of overflowing.
fn secs_to_millis(secs: u64) -> i64 {
    i64::try_from(secs.saturating_mul(1_000)).unwrap_or(i64::MAX)
}

/// Bring the on-screen countdown in line with the timer.
fn follow_rest(
    ui: &mut dyn UserInterface,
    timer: &RestTimer,
    rang: &Cell<bool>,
    shown: Option<ShownRest>,
) -> Option<ShownRest> {
    match (timer.deadline(), shown) {
        (Some(deadline), Some(mut rest)) if rest.deadline == deadline => {
            rest.handle.set_remaining(timer.remaining_secs());
            Some(rest)
        }
        (Some(deadline), previous) => {
            if let Some(mut rest) = previous {
                rest.handle.cancel("Rest restarted");
            }
            let handle = ui.start_countdown("Rest", timer.remaining_secs());
            Some(ShownRest { deadline, handle })
        }
        (None, Some(mut rest)) => {
            if rang.replace(false) {
                rest.handle.finish("Rest complete");
            } else {
                rest.handle.cancel("Rest stopped");
            }
            None
        }
        (None, None) => {
            rang.set(false);
            None
        }
    }
}
