//! Component command implementation.
//!
//! Commands such as `stackwright install git` or `stackwright manage git
//! verify` are not known until components have been scanned. The command
//! tree composed by the registry is turned into a clap command at runtime
//! and the arguments are parsed against it.

use clap::error::ErrorKind;

use crate::error::{Result, StackwrightError};
use crate::registry::{self, CommandNode};
use crate::runner::LocalCommandRunner;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

pub struct ComponentCommand {
    args: Vec<String>,
}

impl ComponentCommand {
    pub fn new(args: Vec<String>) -> Self {
        Self { args }
    }
}

/// Build the clap command for a registry command tree.
pub(crate) fn build_cli(nodes: &[CommandNode]) -> clap::Command {
    nodes.iter().fold(
        clap::Command::new("stackwright")
            .no_binary_name(true)
            .subcommand_required(true)
            .arg_required_else_help(true),
        |cli, node| cli.subcommand(build_node(node)),
    )
}

fn build_node(node: &CommandNode) -> clap::Command {
    let command = clap::Command::new(node.name().to_string()).about(node.help().to_string());
    match node {
        CommandNode::Group { children, .. } => children.iter().fold(
            command
                .subcommand_required(true)
                .arg_required_else_help(true),
            |group, child| group.subcommand(build_node(child)),
        ),
        CommandNode::Command(_) => command,
    }
}

/// Parse `args` against `cli` into the path of the selected command.
pub(crate) fn command_path(cli: clap::Command, args: &[String]) -> std::result::Result<Vec<String>, clap::Error> {
    let matches = cli.try_get_matches_from(args)?;
    let mut path = Vec::new();
    let mut current = &matches;
    while let Some((name, sub)) = current.subcommand() {
        path.push(name.to_string());
        current = sub;
    }
    Ok(path)
}

impl Command for ComponentCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let registry = registry::global();
        let cli = build_cli(&registry.command_tree());

        let path = match command_path(cli, &self.args) {
            Ok(path) => path,
            Err(e) => {
                let rendered = e.render().to_string();
                return match e.kind() {
                    ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
                        ui.message(rendered.trim_end());
                        Ok(CommandResult::success())
                    }
                    _ => {
                        ui.error(rendered.trim_end());
                        Ok(CommandResult::failure(2))
                    }
                };
            }
        };

        let path: Vec<&str> = path.iter().map(String::as_str).collect();
        let command = registry
            .find_command(&path)
            .ok_or_else(|| StackwrightError::Validation {
                message: format!("No command '{}'", path.join(" ")),
            })?;

        let mut runner = LocalCommandRunner::new();
        command.invoke(&mut runner)?;
        ui.success(&format!("{} {}", command.command_type(), command.component().name()));
        Ok(CommandResult::success())
    }
}
