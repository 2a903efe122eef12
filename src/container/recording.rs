//! In-memory container engine for dry runs and tests.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use super::ContainerEngine;
use crate::error::{Result, StackwrightError};
use crate::runner::{RunOptions, RunOutput};

/// A primitive operation requested from a [`RecordingEngine`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCall {
    Create {
        image: String,
    },
    Copy {
        container: String,
        src: PathBuf,
        dst: String,
    },
    Run {
        container: String,
        command: String,
        env: Vec<(String, String)>,
    },
    Commit {
        container: String,
        image_name: Option<String>,
    },
    Remove {
        container: String,
    },
}

/// Records engine calls without touching any container.
///
/// Commands run inside the "container" succeed unless they contain a
/// fragment registered with [`RecordingEngine::fail_on`].
#[derive(Debug, Default)]
pub struct RecordingEngine {
    calls: RefCell<Vec<EngineCall>>,
    failing: Vec<String>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail any command containing `fragment`.
    pub fn fail_on(mut self, fragment: impl Into<String>) -> Self {
        self.failing.push(fragment.into());
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: EngineCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl ContainerEngine for RecordingEngine {
    fn create(&self, image: &str, name: Option<&str>) -> Result<String> {
        self.record(EngineCall::Create {
            image: image.to_string(),
        });
        Ok(name.unwrap_or("working-container").to_string())
    }

    fn copy(&self, container: &str, src: &Path, dst: &str, _chown: Option<&str>) -> Result<()> {
        self.record(EngineCall::Copy {
            container: container.to_string(),
            src: src.to_path_buf(),
            dst: dst.to_string(),
        });
        Ok(())
    }

    fn run(
        &self,
        container: &str,
        command: &str,
        env: &[(String, String)],
        options: &RunOptions,
    ) -> Result<RunOutput> {
        self.record(EngineCall::Run {
            container: container.to_string(),
            command: command.to_string(),
            env: env.to_vec(),
        });

        let failed = self.failing.iter().any(|f| command.contains(f.as_str()));
        if failed && !options.ignore_failure {
            return Err(StackwrightError::CommandFailed {
                command: command.to_string(),
                code: Some(1),
            });
        }
        Ok(RunOutput {
            exit_code: Some(if failed { 1 } else { 0 }),
            stdout: options.capture_stdout.then(String::new),
            stderr: options.capture_stderr.then(String::new),
        })
    }

    fn commit(&self, container: &str, image_name: Option<&str>) -> Result<String> {
        self.record(EngineCall::Commit {
            container: container.to_string(),
            image_name: image_name.map(str::to_string),
        });
        Ok(image_name.unwrap_or("sha256:recorded").to_string())
    }

    fn remove(&self, container: &str) -> Result<()> {
        self.record(EngineCall::Remove {
            container: container.to_string(),
        });
        Ok(())
    }
}
