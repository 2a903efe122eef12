//! A runner that records commands instead of executing them.

use std::collections::HashSet;

use super::{CommandRunner, RunOptions, RunOutput};
use crate::error::{Result, StackwrightError};

/// Records every command it is asked to run.
///
/// Used for dry runs and tests. Commands succeed unless they contain a
/// fragment registered with [`RecordingRunner::fail_on`].
#[derive(Debug, Default, Clone)]
pub struct RecordingRunner {
    commands: Vec<String>,
    env: Vec<(String, String)>,
    available: HashSet<String>,
    probed: Vec<String>,
    failing: Vec<String>,
}

impl RecordingRunner {
    /// Create an empty recording runner with nothing on `PATH`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Report these commands as available to [`CommandRunner::check_command`].
    pub fn with_available<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.available.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Fail any command containing `fragment`.
    pub fn fail_on(mut self, fragment: impl Into<String>) -> Self {
        self.failing.push(fragment.into());
        self
    }

    /// Commands run so far, in order.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }

    /// Environment variables set so far, in order.
    pub fn env(&self) -> &[(String, String)] {
        &self.env
    }

    /// Commands looked up with `check_command`, in order.
    pub fn probed(&self) -> &[String] {
        &self.probed
    }

    /// Index of the first recorded command containing `fragment`.
    pub fn position(&self, fragment: &str) -> Option<usize> {
        self.commands.iter().position(|c| c.contains(fragment))
    }
}

impl CommandRunner for RecordingRunner {
    fn run_with(&mut self, command: &str, options: &RunOptions) -> Result<RunOutput> {
        self.commands.push(command.to_string());

        let failed = self.failing.iter().any(|f| command.contains(f.as_str()));
        let code = if failed { 1 } else { 0 };
        if failed && !options.ignore_failure {
            return Err(StackwrightError::CommandFailed {
                command: command.to_string(),
                code: Some(code),
            });
        }

        Ok(RunOutput {
            exit_code: Some(code),
            stdout: options.capture_stdout.then(String::new),
            stderr: options.capture_stderr.then(String::new),
        })
    }

    fn set_env(&mut self, name: &str, value: &str) {
        self.env.push((name.to_string(), value.to_string()));
    }

    fn check_command(&mut self, name: &str) -> bool {
        self.probed.push(name.to_string());
        self.available.contains(name)
    }

    fn target(&self) -> String {
        "recording".to_string()
    }
}
