//! Terminal UI.

use std::io::Write;

use console::Term;

use super::{
    should_use_colors, OutputMode, ProgressSpinner, SpinnerHandle, StackwrightTheme,
    UserInterface,
};

/// Writes status to stdout and errors to stderr.
pub struct TerminalUI {
    out: Term,
    err: Term,
    theme: StackwrightTheme,
    mode: OutputMode,
}

impl TerminalUI {
    pub fn new(mode: OutputMode) -> Self {
        let theme = if should_use_colors() {
            StackwrightTheme::new()
        } else {
            StackwrightTheme::plain()
        };

        Self {
            out: Term::stdout(),
            err: Term::stderr(),
            theme,
            mode,
        }
    }
}

impl UserInterface for TerminalUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        writeln!(self.out, "{}", msg).ok();
    }

    fn success(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_success(msg)).ok();
        }
    }

    fn warning(&mut self, msg: &str) {
        if self.mode.shows_status() {
            writeln!(self.err, "{}", self.theme.format_warning(msg)).ok();
        }
    }

    fn error(&mut self, msg: &str) {
        writeln!(self.err, "{}", self.theme.format_error(msg)).ok();
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        if self.mode.shows_spinners() && self.out.is_term() {
            Box::new(ProgressSpinner::new(message, self.theme.clone()))
        } else {
            Box::new(ProgressSpinner::hidden())
        }
    }

    fn show_header(&mut self, title: &str) {
        if self.mode.shows_status() {
            writeln!(self.out, "{}", self.theme.format_header(title)).ok();
        }
    }

    fn is_interactive(&self) -> bool {
        self.out.is_term()
    }
}

/// The UI for this process.
pub fn create_ui(mode: OutputMode) -> Box<dyn UserInterface> {
    Box::new(TerminalUI::new(mode))
}
