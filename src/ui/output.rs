//! Output verbosity.

use std::str::FromStr;

/// How much status chatter to print around command output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Status messages and command output.
    #[default]
    Normal,
    /// Command output and errors only.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Pick the mode from the `--quiet` flag.
    pub fn from_quiet(quiet: bool) -> Self {
        if quiet {
            Self::Quiet
        } else {
            Self::Normal
        }
    }

    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Check if this mode draws live progress bars.
    pub fn shows_progress(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_mode_from_str() {
        assert_eq!("normal".parse::<OutputMode>(), Ok(OutputMode::Normal));
        assert_eq!("QUIET".parse::<OutputMode>(), Ok(OutputMode::Quiet));
        assert!("verbose".parse::<OutputMode>().is_err());
    }

    #[test]
    fn quiet_hides_status_and_progress() {
        assert!(OutputMode::Normal.shows_status());
        assert!(OutputMode::Normal.shows_progress());
        assert!(!OutputMode::Quiet.shows_status());
        assert!(!OutputMode::Quiet.shows_progress());
    }

    #[test]
    fn from_quiet_flag() {
        assert_eq!(OutputMode::from_quiet(true), OutputMode::Quiet);
        assert_eq!(OutputMode::from_quiet(false), OutputMode::default());
    }
}
