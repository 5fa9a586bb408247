//! Completion alerts for the rest timer.

use std::io::Write;

/// Side effect fired when a rest period runs out.
pub trait Alarm {
    fn ring(&self);
}

impl<F: Fn()> Alarm for F {
    fn ring(&self) {
        self()
    }
}

/// Rings the terminal bell.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalBell;

impl Alarm for TerminalBell {
    fn ring(&self) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

/// Does nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentAlarm;

impl Alarm for SilentAlarm {
    fn ring(&self) {}
}
