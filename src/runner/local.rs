//! Local process execution.

use std::collections::HashMap;
use std::process::{Command, Stdio};

use tracing::{info, warn};

use super::{CommandRunner, RunOptions, RunOutput};
use crate::error::{Result, StackwrightError};

/// Runs commands on this machine as the current user.
#[derive(Debug, Default)]
pub struct LocalCommandRunner {
    env: HashMap<String, String>,
}

impl LocalCommandRunner {
    /// Create a runner that inherits this process's environment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment variables added on top of the inherited environment.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }
}

impl CommandRunner for LocalCommandRunner {
    fn run_with(&mut self, command: &str, options: &RunOptions) -> Result<RunOutput> {
        info!("Running command: {}", command);

        if options.user.is_some() {
            warn!("Local commands are run by the current user, running as a different user is not supported");
        }

        let (shell, flag) = shell();
        let mut cmd = Command::new(shell);
        cmd.arg(flag).arg(command);

        for (key, value) in &self.env {
            cmd.env(key, value);
        }

        cmd.stdin(Stdio::inherit());
        cmd.stdout(if options.capture_stdout {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });
        cmd.stderr(if options.capture_stderr {
            Stdio::piped()
        } else {
            Stdio::inherit()
        });

        let output = cmd.output().map_err(|_| StackwrightError::CommandFailed {
            command: command.to_string(),
            code: None,
        })?;

        let code = output.status.code();
        if !options.ignore_failure && !output.status.success() {
            return Err(StackwrightError::CommandFailed {
                command: command.to_string(),
                code,
            });
        }

        Ok(RunOutput {
            exit_code: code,
            stdout: options
                .capture_stdout
                .then(|| String::from_utf8_lossy(&output.stdout).to_string()),
            stderr: options
                .capture_stderr
                .then(|| String::from_utf8_lossy(&output.stderr).to_string()),
        })
    }

    fn set_env(&mut self, name: &str, value: &str) {
        self.env.insert(name.to_string(), value.to_string());
    }

    fn check_command(&mut self, name: &str) -> bool {
        which::which(name).is_ok()
    }

    fn target(&self) -> String {
        "local machine".to_string()
    }
}

fn shell() -> (&'static str, &'static str) {
    if cfg!(target_os = "windows") {
        ("cmd.exe", "/C")
    } else {
        ("/bin/sh", "-c")
    }
}
