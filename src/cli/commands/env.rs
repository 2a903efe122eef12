//! Environment command implementations.
//!
//! `stackwright env list`, `env show` and `env schema`.

use std::path::Path;

use crate::config::Configuration;
use crate::environment::{manifest_schema, EnvironmentScanner, SoftwareEnvironment};
use crate::error::{Result, StackwrightError};
use crate::registry::{self, Registry};
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

/// Resolve `environment` as a manifest path if such a file exists, otherwise
/// as the name of an environment under the configured roots.
pub fn resolve_environment(
    config: &Configuration,
    registry: &Registry,
    environment: &str,
) -> Result<SoftwareEnvironment> {
    let path = Path::new(environment);
    if path.is_file() {
        return SoftwareEnvironment::from_file(path, registry);
    }

    let catalog = EnvironmentScanner::new(config.environment_roots()).scan(registry);
    catalog
        .find(environment)
        .cloned()
        .ok_or_else(|| StackwrightError::Validation {
            message: format!(
                "No environment named '{}' (searched {} manifests)",
                environment,
                catalog.len()
            ),
        })
}

pub struct EnvListCommand<'a> {
    config: &'a Configuration,
}

impl<'a> EnvListCommand<'a> {
    pub fn new(config: &'a Configuration) -> Self {
        Self { config }
    }
}

impl Command for EnvListCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = registry::global();
        let catalog = EnvironmentScanner::new(self.config.environment_roots()).scan(&registry);

        ui.show_header("Software environments");
        if catalog.is_empty() {
            ui.message("No software environments found.");
        } else {
            let mut table = Table::new(vec!["Environment", "Components", "Description"]);
            for environment in catalog.environments() {
                let unknown = environment.unknown_components().len();
                let components = if unknown == 0 {
                    environment.components.len().to_string()
                } else {
                    format!("{} ({} unknown)", environment.components.len(), unknown)
                };
                table.add_row(vec![
                    environment.name.clone(),
                    components,
                    environment.description.clone().unwrap_or_default(),
                ]);
            }
            ui.message(&table.render());
        }

        for (path, reason) in catalog.skipped() {
            ui.warning(&format!("Skipped {}: {}", path.display(), reason));
        }
        Ok(CommandResult::success())
    }
}

pub struct EnvShowCommand<'a> {
    config: &'a Configuration,
    environment: &'a str,
}

impl<'a> EnvShowCommand<'a> {
    pub fn new(config: &'a Configuration, environment: &'a str) -> Self {
        Self {
            config,
            environment,
        }
    }

    fn show(environment: &SoftwareEnvironment, registry: &Registry, ui: &mut dyn UserInterface) {
        ui.show_header(&format!("Environment '{}'", environment.name));
        if let Some(description) = &environment.description {
            ui.message(description);
        }
        ui.message(&format!("Manifest: {}", environment.path.display()));

        let platform = &environment.platform;
        if !platform.os.is_empty() {
            let os: Vec<String> = platform.os.iter().map(|os| os.to_string()).collect();
            ui.message(&format!("Operating systems: {}", os.join(", ")));
        }
        for var in &platform.env {
            ui.message(&format!("  {}={}", var.name, var.value));
        }
        for group in &platform.packages {
            ui.message(&format!("Packages ({}): {}", group.manager, group.packages.join(" ")));
        }
        for image in &platform.images {
            ui.message(&format!("Image: {}", image.id));
            for group in &image.packages {
                ui.message(&format!("  packages ({}): {}", group.manager, group.packages.join(" ")));
            }
        }

        let mut table = Table::new(vec!["Component", "Version", "Status", "Purpose"]);
        for component in &environment.components {
            let status = match &component.software_component {
                Some(_) => "ok",
                None => "unknown",
            };
            table.add_row(vec![
                component.name.clone(),
                component.version.clone(),
                status.to_string(),
                component.purpose.clone().unwrap_or_default(),
            ]);
        }
        if !table.is_empty() {
            ui.message(&table.render());
        }

        for issue in environment.check_platform(registry.host()) {
            ui.warning(&issue.to_string());
        }
    }
}

impl Command for EnvShowCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = registry::global();
        let environment = resolve_environment(self.config, &registry, self.environment)?;
        Self::show(&environment, &registry, ui);

        let unknown = environment.unknown_components();
        if unknown.is_empty() {
            Ok(CommandResult::success())
        } else {
            ui.warning(&format!("Unknown components: {}", unknown.join(", ")));
            Ok(CommandResult::failure(1))
        }
    }
}

/// Prints the JSON Schema of environment manifests.
pub struct EnvSchemaCommand;

impl Command for EnvSchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.message(&manifest_schema()?);
        Ok(CommandResult::success())
    }
}
