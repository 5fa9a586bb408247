//! Rest countdown bar.

use indicatif::{ProgressBar, ProgressStyle};

use super::theme::LiftlogTheme;
use super::CountdownHandle;

const TEMPLATE: &str = "{prefix:.bold} [{bar:30.208/dim}] {msg}";

/// An indicatif bar that drains as the rest period runs out.
pub struct CountdownBar {
    bar: ProgressBar,
    total: u64,
}

impl CountdownBar {
    pub fn new(label: &str, total_secs: u64) -> Self {
        let bar = ProgressBar::new(total_secs);
        let style = ProgressStyle::with_template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("█░ ");
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.set_position(total_secs);
        bar.set_message(format!("{}s", total_secs));

        Self {
            bar,
            total: total_secs,
        }
    }

    /// A bar that draws nothing (quiet mode, no TTY).
    pub fn hidden(total_secs: u64) -> Self {
        Self {
            bar: ProgressBar::hidden(),
            total: total_secs,
        }
    }
}

impl CountdownHandle for CountdownBar {
    fn set_remaining(&mut self, secs: u64) {
        self.bar.set_position(secs.min(self.total));
        self.bar.set_message(format!("{}s", secs));
    }

    fn finish(&mut self, msg: &str) {
        self.bar.set_position(0);
        self.bar
            .finish_with_message(LiftlogTheme::new().format_success(msg));
    }

    fn cancel(&mut self, msg: &str) {
        self.bar
            .abandon_with_message(LiftlogTheme::new().format_warning(msg));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_bar_tracks_remaining() {
        let mut bar = CountdownBar::hidden(60);
        bar.set_remaining(35);
        assert_eq!(bar.bar.position(), 35);
        bar.set_remaining(90);
        assert_eq!(bar.bar.position(), 60);
        bar.finish("Rest complete");
        assert!(bar.bar.is_finished());
    }
}
