//! Command-line interface.
//!
//! [`args`] declares the static commands with clap. Component commands are
//! parsed at runtime against the registry's command tree, see
//! [`commands::component`].

pub mod args;
pub mod commands;

pub use args::{Cli, Commands, ConfigArgs, DeployArgs, EnvCommands, ListArgs};
pub use commands::{Command, CommandDispatcher, CommandResult};
