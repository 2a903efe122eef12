//! CLI argument definitions.
//!
//! Static commands are declared here with clap's derive macros. Anything
//! else (`install git`, `manage git verify`, ...) is captured as an external
//! subcommand and parsed against the command tree built from the registry.

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Stackwright - discover software components and deploy environments.
#[derive(Debug, Parser)]
#[command(name = "stackwright")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only print errors and requested data
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Additional component search path, searched first (repeatable)
    #[arg(long = "component-path", value_name = "DIR", global = true)]
    pub component_paths: Vec<PathBuf>,

    /// Additional environment search path, searched first (repeatable)
    #[arg(long = "environment-path", value_name = "DIR", global = true)]
    pub environment_paths: Vec<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List discovered software components
    List(ListArgs),

    /// Work with software environments
    Env {
        #[command(subcommand)]
        command: EnvCommands,
    },

    /// Show the resolved configuration
    Config(ConfigArgs),

    /// Component commands, e.g. `install git` or `manage git verify`
    #[command(external_subcommand)]
    Component(Vec<String>),
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct ListArgs {
    /// Also print scan diagnostics
    #[arg(long)]
    pub diagnostics: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Clone, Subcommand)]
pub enum EnvCommands {
    /// List available environments
    List,

    /// Show an environment and how its components resolved
    Show {
        /// Environment name or path to a manifest
        environment: String,
    },

    /// Deploy an environment locally or into a container image
    Deploy(DeployArgs),

    /// Print the JSON Schema of environment manifests
    Schema,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct DeployArgs {
    /// Environment name or path to a manifest
    pub environment: String,

    /// Deploy into a working container instead of this machine
    #[arg(long)]
    pub container: bool,

    /// Base image (defaults to the environment's only image)
    #[arg(long, requires = "container")]
    pub image: Option<String>,

    /// Name of the working container
    #[arg(long, requires = "container")]
    pub name: Option<String>,

    /// Commit the container to this image name when done
    #[arg(long, requires = "container")]
    pub commit: Option<String>,

    /// Print the plan without executing it
    #[arg(long)]
    pub dry_run: bool,

    /// Deploy even if some requested components are unknown
    #[arg(long)]
    pub skip_unknown: bool,
}

#[derive(Debug, Clone, Default, clap::Args)]
pub struct ConfigArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn global_paths_before_component_command() {
        let cli = Cli::parse_from([
            "stackwright",
            "--component-path",
            "/tmp/components",
            "install",
            "git",
        ]);
        assert_eq!(cli.component_paths, [PathBuf::from("/tmp/components")]);
        match cli.command {
            Some(Commands::Component(args)) => assert_eq!(args, ["install", "git"]),
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::parse_from(["stackwright", "-vv", "list"]);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn deploy_arguments() {
        let cli = Cli::parse_from([
            "stackwright",
            "env",
            "deploy",
            "dev",
            "--container",
            "--image",
            "ubuntu:24.04",
            "--dry-run",
        ]);
        match cli.command {
            Some(Commands::Env {
                command: EnvCommands::Deploy(args),
            }) => {
                assert_eq!(args.environment, "dev");
                assert!(args.container);
                assert_eq!(args.image.as_deref(), Some("ubuntu:24.04"));
                assert!(args.dry_run);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn image_requires_container() {
        assert!(Cli::try_parse_from(["stackwright", "env", "deploy", "dev", "--image", "x"]).is_err());
    }
}
