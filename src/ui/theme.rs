//! Visual theme and styling.

use console::Style;

/// liftlog's visual theme.
#[derive(Debug, Clone)]
pub struct LiftlogTheme {
    /// Style for success messages (green).
    pub success: Style,
    /// Style for warning messages (orange).
    pub warning: Style,
    /// Style for error messages (red bold).
    pub error: Style,
    /// Style for the running rest countdown (orange bold).
    pub rest: Style,
    /// Style for dim/secondary text.
    pub dim: Style,
    /// Style for headers (bold).
    pub header: Style,
    /// Style for exercise names (bold).
    pub exercise: Style,
    /// Style for sets with no reps recorded (dim).
    pub pending: Style,
    /// Style for notes (italic).
    pub note: Style,
}

impl Default for LiftlogTheme {
    fn default() -> Self {
        Self::new()
    }
}

impl LiftlogTheme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            rest: Style::new().color256(208).bold(),
            dim: Style::new().dim(),
            header: Style::new().bold(),
            exercise: Style::new().bold(),
            pending: Style::new().dim(),
            note: Style::new().italic(),
        }
    }

    /// Create a theme without colors (for non-TTY or NO_COLOR).
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            rest: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            exercise: Style::new(),
            pending: Style::new(),
            note: Style::new(),
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        format!("{}", self.success.apply_to(format!("✓ {}", msg)))
    }

    pub fn format_warning(&self, msg: &str) -> String {
        format!("{}", self.warning.apply_to(format!("⚠ {}", msg)))
    }

    pub fn format_error(&self, msg: &str) -> String {
        format!("{}", self.error.apply_to(format!("✗ {}", msg)))
    }

    pub fn format_header(&self, title: &str) -> String {
        format!("{}", self.header.apply_to(title))
    }

    /// Footer label for the rest button: `Rest: 42s` or `Start rest`.
    pub fn format_rest(&self, remaining: Option<u64>) -> String {
        match remaining {
            Some(secs) => format!("{}", self.rest.apply_to(format!("Rest: {}s", secs))),
            None => format!("{}", self.dim.apply_to("Start rest")),
        }
    }
}

/// Check if colors should be enabled.
pub fn should_use_colors() -> bool {
    // https://no-color.org/
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    console::Term::stdout().is_term()
}
