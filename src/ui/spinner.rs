//! Progress spinners.

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

use super::theme::StackwrightTheme;
use super::SpinnerHandle;

/// A progress spinner for long-running operations.
pub struct ProgressSpinner {
    bar: ProgressBar,
    theme: StackwrightTheme,
}

impl ProgressSpinner {
    pub fn new(message: &str, theme: StackwrightTheme) -> Self {
        let bar = ProgressBar::new_spinner();
        if let Ok(style) = ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner:.cyan} {msg}")
        {
            bar.set_style(style);
        }
        bar.set_message(message.to_string());
        bar.enable_steady_tick(Duration::from_millis(80));
        Self { bar, theme }
    }

    /// A spinner that never draws.
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            theme: StackwrightTheme::plain(),
        }
    }

    fn finish(&mut self, line: String) {
        if let Ok(style) = ProgressStyle::default_spinner().template("{msg}") {
            self.bar.set_style(style);
        }
        self.bar.finish_with_message(line);
    }
}

impl SpinnerHandle for ProgressSpinner {
    fn set_message(&mut self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let line = self.theme.format_success(msg);
        self.finish(line);
    }

    fn finish_error(&mut self, msg: &str) {
        let line = self.theme.format_error(msg);
        self.finish(line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_spinner_finishes() {
        let mut spinner = ProgressSpinner::hidden();
        spinner.set_message("Deploying");
        spinner.finish_success("Deployed");
        assert!(spinner.bar.is_finished());
    }
}
