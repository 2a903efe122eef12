//! Per-scan intermediate records.

use std::path::PathBuf;

use crate::component::{CommandType, SoftwareComponent};

/// A declarative command waiting for its component.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Descriptor the command was read from.
    pub source: PathBuf,
    pub provider: String,
    pub command_type: CommandType,
    /// Provider-specific configuration, passed through untouched.
    pub configuration: serde_yaml::Value,
}

/// Everything discovered for one component name during a scan.
#[derive(Debug, Default)]
pub struct ComponentResult {
    pub folders: Vec<PathBuf>,
    pub files: Vec<PathBuf>,
    /// Component built by a native plugin, if any.
    pub component: Option<SoftwareComponent>,
    pub commands: Vec<CommandResult>,
}

impl ComponentResult {
    /// Whether nothing defines this component beyond plain files.
    pub fn is_undefined(&self) -> bool {
        self.component.is_none() && self.commands.is_empty()
    }
}
