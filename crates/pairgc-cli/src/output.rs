//! Shared colored output utilities for CLI commands.
//!
//! Uses `termcolor` for cross-platform colored terminal output.
//! Respects `NO_COLOR` environment variable and `--color` flag.

use std::io::Write;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

/// Resolve `ColorChoice` from CLI flag and environment.
///
/// Priority: `NO_COLOR` env > `--color` flag > auto-detect TTY.
pub fn resolve_color_choice(flag: &str) -> ColorChoice {
    if std::env::var_os("NO_COLOR").is_some() {
        return ColorChoice::Never;
    }
    match flag {
        "always" => ColorChoice::Always,
        "never" => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// Styled output writer for terminal.
pub struct StyledOutput {
    stdout: StandardStream,
}

impl StyledOutput {
    /// Create a new styled output with the given color choice.
    pub fn new(choice: ColorChoice) -> Self {
        Self {
            stdout: StandardStream::stdout(choice),
        }
    }

    fn write_styled(&mut self, text: &str, spec: &ColorSpec) {
        let _ = self.stdout.set_color(spec);
        let _ = write!(self.stdout, "{}", text);
        let _ = self.stdout.reset();
    }

    /// Bold text in the given color.
    pub fn heading(&mut self, text: &str, color: Color) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(color)).set_bold(true);
        self.write_styled(text, &spec);
    }

    /// Dim/gray text.
    pub fn dim(&mut self, text: &str) {
        let mut spec = ColorSpec::new();
        spec.set_fg(Some(Color::White));
        self.write_styled(text, &spec);
    }

    /// Plain text (no color).
    pub fn plain(&mut self, text: &str) {
        let _ = write!(self.stdout, "{}", text);
    }

    /// Newline.
    pub fn newline(&mut self) {
        let _ = writeln!(self.stdout);
    }

    /// Flush stdout.
    pub fn flush(&mut self) {
        let _ = self.stdout.flush();
    }

    // ── Scenario badges ──────────────────────────────────────────────

    /// " PASS " badge (green background, white text).
    pub fn pass_badge(&mut self) {
        self.badge(" PASS ", Color::Green);
    }

    /// " FAIL " badge (red background, white text).
    pub fn fail_badge(&mut self) {
        self.badge(" FAIL ", Color::Red);
    }

    fn badge(&mut self, text: &str, background: Color) {
        let mut spec = ColorSpec::new();
        spec.set_bg(Some(background))
            .set_fg(Some(Color::White))
            .set_bold(true);
        self.write_styled(text, &spec);
    }
}
