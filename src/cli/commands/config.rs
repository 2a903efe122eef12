//! Config command implementation.
//!
//! The `stackwright config` command shows the resolved configuration.

use crate::cli::args::ConfigArgs;
use crate::config::Configuration;
use crate::error::{Result, StackwrightError};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct ConfigCommand<'a> {
    config: &'a Configuration,
    args: ConfigArgs,
}

impl<'a> ConfigCommand<'a> {
    pub fn new(config: &'a Configuration, args: ConfigArgs) -> Self {
        Self { config, args }
    }
}

impl Command for ConfigCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if self.args.json {
            let json = serde_json::to_string_pretty(self.config)
                .map_err(|e| StackwrightError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        for path in &self.config.sources {
            ui.message(&format!("# {}", path.display()));
        }
        let yaml =
            serde_yaml::to_string(self.config).map_err(|e| StackwrightError::Other(e.into()))?;
        ui.message(yaml.trim_end());

        ui.message("");
        ui.message("# component roots");
        for root in self.config.component_roots() {
            ui.message(&format!("#   {}", root.display()));
        }
        ui.message("# environment roots");
        for root in self.config.environment_roots() {
            ui.message(&format!("#   {}", root.display()));
        }
        Ok(CommandResult::success())
    }
}
