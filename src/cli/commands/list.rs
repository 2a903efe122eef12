//! List command implementation.
//!
//! The `stackwright list` command lists registered components and their
//! commands, marking commands this host cannot run.

use std::path::PathBuf;

use serde::Serialize;

use crate::cli::args::ListArgs;
use crate::component::ComponentOrigin;
use crate::error::{Result, StackwrightError};
use crate::registry::{self, Registry};
use crate::scanner::ScanReport;
use crate::ui::{Table, UserInterface};

use super::dispatcher::{Command, CommandResult};

pub struct ListCommand {
    report: ScanReport,
    args: ListArgs,
}

#[derive(Debug, Serialize)]
struct ComponentSummary {
    name: String,
    origin: String,
    folders: Vec<PathBuf>,
    commands: Vec<CommandSummary>,
}

#[derive(Debug, Serialize)]
struct CommandSummary {
    name: String,
    supported: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    issues: Vec<String>,
}

#[derive(Debug, Serialize)]
struct Listing<'a> {
    components: Vec<ComponentSummary>,
    diagnostics: &'a [crate::scanner::ScanDiagnostic],
}

impl ListCommand {
    pub fn new(report: ScanReport, args: ListArgs) -> Self {
        Self { report, args }
    }

    fn summarize(registry: &Registry) -> Vec<ComponentSummary> {
        registry
            .components()
            .iter()
            .map(|component| {
                let commands = registry
                    .manage_group(component.name())
                    .map(|group| {
                        group
                            .commands
                            .iter()
                            .map(|command| CommandSummary {
                                name: command.name().to_string(),
                                supported: command.is_supported(),
                                issues: command.issues().iter().map(|i| i.to_string()).collect(),
                            })
                            .collect()
                    })
                    .unwrap_or_default();

                ComponentSummary {
                    name: component.name().to_string(),
                    origin: match component.origin() {
                        ComponentOrigin::Native { plugin } => format!("native ({})", plugin),
                        ComponentOrigin::Descriptor => "descriptor".to_string(),
                    },
                    folders: component.folders().to_vec(),
                    commands,
                }
            })
            .collect()
    }
}

impl Command for ListCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let components = Self::summarize(&registry::global());

        if self.args.json {
            let listing = Listing {
                components,
                diagnostics: &self.report.diagnostics,
            };
            let json = serde_json::to_string_pretty(&listing)
                .map_err(|e| StackwrightError::Other(e.into()))?;
            ui.message(&json);
            return Ok(CommandResult::success());
        }

        let mut table = Table::new(vec!["Component", "Origin", "Commands"]);
        for component in &components {
            let commands: Vec<String> = component
                .commands
                .iter()
                .map(|c| {
                    if c.supported {
                        c.name.clone()
                    } else {
                        format!("{}*", c.name)
                    }
                })
                .collect();
            table.add_row(vec![
                component.name.clone(),
                component.origin.clone(),
                commands.join(", "),
            ]);
        }

        ui.show_header("Software components");
        if table.is_empty() {
            ui.message("No software components found.");
        } else {
            ui.message(&table.render());
            if components.iter().any(|c| c.commands.iter().any(|cmd| !cmd.supported)) {
                ui.message("* not supported on this machine");
            }
        }

        if self.args.diagnostics {
            for diagnostic in &self.report.diagnostics {
                ui.warning(&diagnostic.to_string());
            }
        } else if !self.report.is_clean() {
            ui.warning(&format!(
                "{} problems found while scanning, run with --diagnostics to see them",
                self.report.diagnostics.len()
            ));
        }

        Ok(CommandResult::success())
    }
}
