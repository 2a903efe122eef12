//! The software component aggregate.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::command::{BuiltCommand, Command, CommandType};
use crate::platform::{HostProbe, PlatformIssue};

/// Platform requirements shared by every command of a component.
pub type Requirements = Arc<dyn Fn(&dyn HostProbe) -> Vec<PlatformIssue> + Send + Sync>;

/// How a component came to exist.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ComponentOrigin {
    /// Constructed by a compiled-in plugin.
    Native { plugin: String },
    /// Synthesized from declarative command descriptors.
    Descriptor,
}

/// A named unit owning at most one command per lifecycle type.
#[derive(Clone)]
pub struct SoftwareComponent {
    name: String,
    description: Option<String>,
    origin: ComponentOrigin,
    folders: Vec<PathBuf>,
    files: Vec<PathBuf>,
    commands: BTreeMap<CommandType, Command>,
    requirements: Option<Requirements>,
}

impl SoftwareComponent {
    /// A generic component with no commands.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            origin: ComponentOrigin::Descriptor,
            folders: Vec::new(),
            files: Vec::new(),
            commands: BTreeMap::new(),
            requirements: None,
        }
    }

    /// A component constructed by the native plugin `plugin`.
    pub fn native(name: impl Into<String>, plugin: impl Into<String>) -> Self {
        Self {
            origin: ComponentOrigin::Native {
                plugin: plugin.into(),
            },
            ..Self::new(name)
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set checks every command of this component must pass.
    pub fn with_requirements<F>(mut self, requirements: F) -> Self
    where
        F: Fn(&dyn HostProbe) -> Vec<PlatformIssue> + Send + Sync + 'static,
    {
        self.requirements = Some(Arc::new(requirements));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: impl Into<String>) {
        self.description = Some(description.into());
    }

    pub fn origin(&self) -> &ComponentOrigin {
        &self.origin
    }

    /// Folders this component was assembled from, in scan order.
    pub fn folders(&self) -> &[PathBuf] {
        &self.folders
    }

    /// Files found in this component's folders, in scan order.
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    pub fn add_folder(&mut self, folder: impl Into<PathBuf>) {
        let folder = folder.into();
        if !self.folders.contains(&folder) {
            self.folders.push(folder);
        }
    }

    pub fn add_file(&mut self, file: impl Into<PathBuf>) {
        let file = file.into();
        if !self.files.contains(&file) {
            self.files.push(file);
        }
    }

    /// Attach `command`, returning whether it was stored.
    ///
    /// An existing command of the same type is only replaced when `force` is
    /// set. `manage` commands cannot be attached; the manage group is derived.
    pub fn add_command(&mut self, command: Command, force: bool) -> bool {
        let command_type = command.command_type();
        if command_type == CommandType::Manage {
            warn!(
                "Ignoring 'manage' command for '{}', manage groups are assembled automatically",
                self.name
            );
            return false;
        }
        if self.commands.contains_key(&command_type) {
            if !force {
                trace!(
                    "The '{}' component already has a '{}' command",
                    self.name,
                    command_type
                );
                return false;
            }
            debug!(
                "Overwriting the existing '{}' command on '{}' component",
                command_type, self.name
            );
        }
        self.commands.insert(command_type, command);
        true
    }

    pub fn command(&self, command_type: CommandType) -> Option<&Command> {
        self.commands.get(&command_type)
    }

    /// Commands in lifecycle order.
    pub fn commands(&self) -> impl Iterator<Item = &Command> {
        self.commands.values()
    }

    pub fn command_types(&self) -> Vec<CommandType> {
        self.commands.keys().copied().collect()
    }

    /// First collected file matching `pattern`, compared from the right.
    pub fn get_file(&self, pattern: &str) -> Option<&Path> {
        self.files
            .iter()
            .find(|file| crate::glob::path_matches(file, pattern))
            .map(PathBuf::as_path)
    }

    /// Issues preventing any command of this component from running on `host`.
    pub fn supports_platform(&self, host: &dyn HostProbe) -> Vec<PlatformIssue> {
        match &self.requirements {
            Some(requirements) => requirements(host),
            None => Vec::new(),
        }
    }

    /// A component is usable once it owns at least one command.
    pub fn is_valid(&self) -> bool {
        !self.commands.is_empty()
    }

    pub fn help(&self) -> String {
        self.description
            .clone()
            .unwrap_or_else(|| format!("Manage the {} software component.", self.name))
    }

    /// Build the command of `command_type`, if this component has one.
    pub fn build_command(
        self: &Arc<Self>,
        command_type: CommandType,
        host: &dyn HostProbe,
        name: Option<&str>,
    ) -> Option<BuiltCommand> {
        self.command(command_type)
            .map(|command| command.build(self, host, name))
    }
}

impl fmt::Debug for SoftwareComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SoftwareComponent")
            .field("name", &self.name)
            .field("origin", &self.origin)
            .field("folders", &self.folders)
            .field("files", &self.files)
            .field("commands", &self.command_types())
            .finish()
    }
}
