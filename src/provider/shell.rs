//! Shell script commands.

use std::sync::Arc;

use anyhow::Context;
use serde::Deserialize;

use super::CommandProvider;
use crate::component::{Action, CommandContext, CommandType};
use crate::error::Result;
use crate::runner::RunOptions;

/// Configuration of a `shell` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ShellConfig {
    /// Script passed to the target's shell.
    pub script: String,
    /// Run as this `user[:group]`.
    #[serde(default)]
    pub user: Option<String>,
    /// Help text for the command.
    #[serde(default)]
    pub description: Option<String>,
}

/// Runs a configured script through the command runner.
pub struct ShellScript {
    config: ShellConfig,
}

impl ShellScript {
    pub fn new(config: ShellConfig) -> Self {
        Self { config }
    }
}

impl Action for ShellScript {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let options = RunOptions {
            user: self.config.user.clone(),
            ..Default::default()
        };
        ctx.runner.run_with(&self.config.script, &options)?;
        Ok(())
    }

    fn help(&self) -> Option<String> {
        self.config.description.clone()
    }
}

/// Provides `shell` commands of any lifecycle type.
pub struct ShellProvider;

impl CommandProvider for ShellProvider {
    fn name(&self) -> &'static str {
        "shell"
    }

    fn supports(&self, command_type: CommandType) -> bool {
        command_type != CommandType::Manage
    }

    fn create(
        &self,
        _command_type: CommandType,
        configuration: &serde_yaml::Value,
    ) -> anyhow::Result<Arc<dyn Action>> {
        let config: ShellConfig = serde_yaml::from_value(configuration.clone())
            .context("expected 'script' and optional 'user', 'description'")?;
        Ok(Arc::new(ShellScript::new(config)))
    }
}
