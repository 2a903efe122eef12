//! Command execution targets.
//!
//! A [`CommandRunner`] abstracts where a shell command runs: on this machine
//! ([`LocalCommandRunner`]) or inside a working container
//! ([`crate::container::ContainerCommandRunner`]). Install commands, package
//! managers and deployment plans only ever talk to this trait.

pub mod local;
pub mod recording;

pub use local::LocalCommandRunner;
pub use recording::RecordingRunner;

use crate::error::Result;

/// Options for a single command run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    /// Run as this `user[:group]` instead of the current user.
    pub user: Option<String>,

    /// Capture stdout (if false, inherits from parent).
    pub capture_stdout: bool,

    /// Capture stderr (if false, inherits from parent).
    pub capture_stderr: bool,

    /// Return non-zero exits as output instead of an error.
    pub ignore_failure: bool,
}

impl RunOptions {
    /// Capture both output streams.
    pub fn captured() -> Self {
        Self {
            capture_stdout: true,
            capture_stderr: true,
            ..Default::default()
        }
    }

    /// Capture both output streams and tolerate failure.
    pub fn probe() -> Self {
        Self {
            ignore_failure: true,
            ..Self::captured()
        }
    }

    /// Run as the given user.
    pub fn as_user(mut self, user: impl Into<String>) -> Self {
        self.user = Some(user.into());
        self
    }
}

/// Result of running a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    /// Exit code (None if killed by signal).
    pub exit_code: Option<i32>,

    /// Standard output, when captured.
    pub stdout: Option<String>,

    /// Standard error, when captured.
    pub stderr: Option<String>,
}

impl RunOutput {
    /// Whether the command exited with code 0.
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Executes shell commands on some target.
pub trait CommandRunner {
    /// Run `command` through the target's shell.
    ///
    /// A non-zero exit is an error unless `options.ignore_failure` is set.
    fn run_with(&mut self, command: &str, options: &RunOptions) -> Result<RunOutput>;

    /// Run `command` with default options.
    fn run(&mut self, command: &str) -> Result<RunOutput> {
        self.run_with(command, &RunOptions::default())
    }

    /// Set an environment variable for every subsequent command.
    fn set_env(&mut self, name: &str, value: &str);

    /// Whether `name` is an executable on the target's `PATH`.
    fn check_command(&mut self, name: &str) -> bool {
        let probe = RunOptions::probe();
        let has_builtin = self
            .run_with("command", &probe)
            .map(|output| output.success())
            .unwrap_or(false);
        let lookup = if has_builtin {
            format!("command -v {}", name)
        } else {
            format!("which {}", name)
        };
        self.run_with(&lookup, &probe)
            .map(|output| output.success())
            .unwrap_or(false)
    }

    /// Short description of the target, used in log messages.
    fn target(&self) -> String;
}
