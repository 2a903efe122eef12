//! Command runner targeting a working container.

use super::ContainerEngine;
use crate::error::Result;
use crate::runner::{CommandRunner, RunOptions, RunOutput};

/// Runs commands inside an existing working container.
pub struct ContainerCommandRunner<'e> {
    engine: &'e dyn ContainerEngine,
    container: String,
    env: Vec<(String, String)>,
}

impl<'e> ContainerCommandRunner<'e> {
    pub fn new(engine: &'e dyn ContainerEngine, container: impl Into<String>) -> Self {
        Self {
            engine,
            container: container.into(),
            env: Vec::new(),
        }
    }

    /// The working container id.
    pub fn container(&self) -> &str {
        &self.container
    }
}

impl CommandRunner for ContainerCommandRunner<'_> {
    fn run_with(&mut self, command: &str, options: &RunOptions) -> Result<RunOutput> {
        self.engine
            .run(&self.container, command, &self.env, options)
    }

    fn set_env(&mut self, name: &str, value: &str) {
        self.env.retain(|(existing, _)| existing != name);
        self.env.push((name.to_string(), value.to_string()));
    }

    fn target(&self) -> String {
        format!("container '{}'", self.container)
    }
}
