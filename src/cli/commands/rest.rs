//! Rest command implementation.
//!
//! The `liftlog rest` command starts, stops, and reports the shared rest
//! timer. `rest start --wait` stays in the foreground with a countdown
//! until the period ends or another session stops it.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::cli::args::{RestAction, RestArgs};
use crate::config::LiftlogConfig;
use crate::error::Result;
use crate::runtime::Runtime;
use crate::timer::{Alarm, RestTimer, SilentAlarm, TerminalBell, TimerState};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display;

/// How long each foreground slice drives the event loop.
pub(super) const FRAME_MS: u64 = 200;

/// Alarm that records that it fired and optionally rings the bell.
pub(super) fn tracking_alarm(bell: bool) -> (impl Alarm + 'static, Rc<Cell<bool>>) {
    let rang = Rc::new(Cell::new(false));
    let flag = Rc::clone(&rang);
    let alarm = move || {
        flag.set(true);
        if bell {
            TerminalBell.ring();
        }
    };
    (alarm, rang)
}

/// The rest command implementation.
pub struct RestCommand {
    runtime: Runtime,
    config: LiftlogConfig,
    args: RestArgs,
}

impl RestCommand {
    /// Create a new rest command.
    pub fn new(runtime: &Runtime, config: &LiftlogConfig, args: RestArgs) -> Self {
        Self {
            runtime: runtime.clone(),
            config: config.clone(),
            args,
        }
    }

    fn wait(&self, timer: &RestTimer, rang: &Cell<bool>, ui: &mut dyn UserInterface) {
        let mut countdown = ui.start_countdown("Rest", timer.remaining_secs());
        self.runtime.start_polling(self.config.poll_interval_ms as i64);

        while timer.is_running() {
            self.runtime.run_for(Duration::from_millis(FRAME_MS));
            countdown.set_remaining(timer.remaining_secs());
        }

        self.runtime.stop_polling();
        if rang.get() {
            countdown.finish("Rest complete");
        } else {
            countdown.cancel("Rest stopped");
        }
    }
}

impl Command for RestCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let theme = display::theme();

        match &self.args.action {
            RestAction::Start(args) => {
                let secs = args.duration.unwrap_or(self.config.rest_duration_secs);
                if secs == 0 {
                    ui.error("Rest duration must be at least one second");
                    return Ok(CommandResult::failure(2));
                }

                let (alarm, rang) = tracking_alarm(self.config.bell && !args.no_bell);
                let timer = RestTimer::bind(&self.runtime, alarm)?;
                timer.start(secs)?;
                tracing::debug!("Rest deadline {:?}", timer.deadline());

                if args.wait {
                    self.wait(&timer, &rang, ui);
                } else {
                    ui.success(&format!("Rest started: {}s", secs));
                }
            }
            RestAction::Stop => {
                let timer = RestTimer::bind(&self.runtime, SilentAlarm)?;
                if timer.is_running() {
                    timer.stop()?;
                    ui.success("Rest stopped");
                } else {
                    ui.message("No rest running");
                }
            }
            RestAction::Toggle(args) => {
                let secs = args.duration.unwrap_or(self.config.rest_duration_secs);
                let timer = RestTimer::bind(&self.runtime, SilentAlarm)?;
                match timer.toggle(secs)? {
                    TimerState::Running { remaining_secs } => {
                        ui.success(&format!("Rest started: {}s", remaining_secs))
                    }
                    TimerState::Idle => ui.success("Rest stopped"),
                }
            }
            RestAction::Status => {
                let timer = RestTimer::bind(&self.runtime, SilentAlarm)?;
                ui.emit(&display::render_rest(timer.state(), &theme));
            }
        }

        Ok(CommandResult::success())
    }
}
