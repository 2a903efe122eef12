//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use tracing::debug;

use crate::cli::args::{Cli, Commands, EnvCommands};
use crate::component::NativeCatalog;
use crate::config::Configuration;
use crate::error::Result;
use crate::provider::ProviderRegistry;
use crate::registry;
use crate::scanner::{ComponentScanner, ScanReport};
use crate::ui::UserInterface;

/// Trait for command implementations.
pub trait Command {
    /// Execute the command.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    pub success: bool,
    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Scan the configured component roots into the process-wide registry.
///
/// The registry is cleared first, so calling this again rescans.
pub fn scan_components(config: &Configuration) -> ScanReport {
    let catalog = NativeCatalog::builtin();
    let providers = ProviderRegistry::builtin();
    let roots = config.component_roots();
    debug!("Scanning {} component roots", roots.len());

    let mut registry = registry::global_mut();
    registry.reset();
    ComponentScanner::new(&catalog, &providers).scan(&roots, &mut registry)
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    config: Configuration,
}

impl CommandDispatcher {
    /// `config` already includes paths given on the command line.
    pub fn new(config: Configuration) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &Configuration {
        &self.config
    }

    /// Dispatch and execute a command.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Some(Commands::Config(args)) => {
                super::config::ConfigCommand::new(&self.config, args.clone()).execute(ui)
            }
            Some(Commands::Env { command }) => self.dispatch_env(command, ui),
            Some(Commands::List(args)) => {
                let report = scan_components(&self.config);
                super::list::ListCommand::new(report, args.clone()).execute(ui)
            }
            Some(Commands::Component(args)) => {
                scan_components(&self.config);
                super::component::ComponentCommand::new(args.clone()).execute(ui)
            }
            None => {
                scan_components(&self.config);
                super::component::ComponentCommand::new(vec!["--help".to_string()]).execute(ui)
            }
        }
    }

    fn dispatch_env(&self, command: &EnvCommands, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        if !matches!(command, EnvCommands::Schema) {
            scan_components(&self.config);
        }
        match command {
            EnvCommands::List => super::env::EnvListCommand::new(&self.config).execute(ui),
            EnvCommands::Show { environment } => {
                super::env::EnvShowCommand::new(&self.config, environment).execute(ui)
            }
            EnvCommands::Deploy(args) => {
                super::deploy::DeployCommand::new(&self.config, args.clone()).execute(ui)
            }
            EnvCommands::Schema => super::env::EnvSchemaCommand.execute(ui),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_result_codes() {
        assert_eq!(CommandResult::success().exit_code, 0);
        let failure = CommandResult::failure(2);
        assert!(!failure.success);
        assert_eq!(failure.exit_code, 2);
    }
}
