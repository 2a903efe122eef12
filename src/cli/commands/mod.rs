//! Command implementations.

pub mod component;
pub mod config;
pub mod deploy;
pub mod dispatcher;
pub mod env;
pub mod list;

pub use dispatcher::{scan_components, Command, CommandDispatcher, CommandResult};
