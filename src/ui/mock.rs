//! Mock UI implementation for testing.
//!
//! `MockUI` implements the `UserInterface` trait and captures all
//! interactions for later assertion.

use std::cell::RefCell;
use std::rc::Rc;

use super::{OutputMode, SpinnerHandle, UserInterface};

/// Captures all UI interactions.
#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    interactive: bool,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    headers: Vec<String>,
    spinners: Vec<Rc<RefCell<MockSpinner>>>,
}

impl MockUI {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn set_interactive(&mut self, interactive: bool) {
        self.interactive = interactive;
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Spinners started so far, in their current state.
    pub fn spinners(&self) -> Vec<MockSpinner> {
        self.spinners.iter().map(|s| s.borrow().clone()).collect()
    }

    pub fn has_message(&self, msg: &str) -> bool {
        self.messages.iter().any(|m| m.contains(msg))
    }

    pub fn has_success(&self, msg: &str) -> bool {
        self.successes.iter().any(|m| m.contains(msg))
    }

    pub fn has_warning(&self, msg: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(msg))
    }

    pub fn has_error(&self, msg: &str) -> bool {
        self.errors.iter().any(|m| m.contains(msg))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        let spinner = Rc::new(RefCell::new(MockSpinner {
            messages: vec![message.to_string()],
            ..Default::default()
        }));
        self.spinners.push(Rc::clone(&spinner));
        Box::new(SharedSpinner(spinner))
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn is_interactive(&self) -> bool {
        self.interactive
    }
}

/// Status of a mock spinner when finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpinnerStatus {
    Success,
    Error,
}

/// Recorded state of a spinner started on a [`MockUI`].
#[derive(Debug, Clone, Default)]
pub struct MockSpinner {
    /// Initial message followed by every update.
    pub messages: Vec<String>,
    pub finish_message: Option<String>,
    pub status: Option<SpinnerStatus>,
}

struct SharedSpinner(Rc<RefCell<MockSpinner>>);

impl SpinnerHandle for SharedSpinner {
    fn set_message(&mut self, msg: &str) {
        self.0.borrow_mut().messages.push(msg.to_string());
    }

    fn finish_success(&mut self, msg: &str) {
        let mut spinner = self.0.borrow_mut();
        spinner.finish_message = Some(msg.to_string());
        spinner.status = Some(SpinnerStatus::Success);
    }

    fn finish_error(&mut self, msg: &str) {
        let mut spinner = self.0.borrow_mut();
        spinner.finish_message = Some(msg.to_string());
        spinner.status = Some(SpinnerStatus::Error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_output() {
        let mut ui = MockUI::new();
        ui.message("plain");
        ui.success("done");
        ui.warning("careful");
        ui.error("failed");
        ui.show_header("Components");

        assert!(ui.has_message("plain"));
        assert!(ui.has_success("done"));
        assert!(ui.has_warning("careful"));
        assert!(ui.has_error("failed"));
        assert_eq!(ui.headers(), ["Components"]);
    }

    #[test]
    fn spinners_record_their_outcome() {
        let mut ui = MockUI::new();
        let mut spinner = ui.start_spinner("Deploying 'dev'");
        spinner.set_message("Installing git");
        spinner.finish_error("Deployment failed");

        let spinners = ui.spinners();
        assert_eq!(spinners.len(), 1);
        assert_eq!(spinners[0].messages, ["Deploying 'dev'", "Installing git"]);
        assert_eq!(spinners[0].status, Some(SpinnerStatus::Error));
    }
}
