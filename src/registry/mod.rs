//! Component and command registries.
//!
//! A [`Registry`] tracks every registered [`SoftwareComponent`] and, at
//! registration time, builds each of its commands against the registry's
//! host. Built commands land in one bucket per [`CommandType`] (created on
//! first use) and in a per-component `manage` group.
//!
//! Tests and embedders construct private registries. The binary uses the
//! process-wide instance behind [`global`], which [`reset_global`] clears
//! so a long-lived host can rescan.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stackwright::component::NativeCatalog;
//! use stackwright::platform::{OperatingSystem, StaticHost};
//! use stackwright::registry::Registry;
//!
//! let mut registry = Registry::new(Arc::new(StaticHost::new(OperatingSystem::Linux)));
//! let git = NativeCatalog::builtin().find("git").unwrap().build("git").unwrap();
//! registry.register_component(git);
//!
//! assert!(registry.find_component("git").is_some());
//! assert!(registry.find_command(&["install", "git"]).is_some());
//! assert!(registry.find_command(&["manage", "git", "verify"]).is_some());
//! ```

pub mod tree;

pub use tree::{CommandGroup, CommandNode};

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock, RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::{debug, trace};

use crate::component::{BuiltCommand, CommandType, SoftwareComponent};
use crate::platform::{HostProbe, SystemHost};

/// Registered components and their built commands.
pub struct Registry {
    host: Arc<dyn HostProbe>,
    components: Vec<Arc<SoftwareComponent>>,
    groups: BTreeMap<CommandType, CommandGroup>,
    manage: Vec<CommandGroup>,
}

impl Registry {
    /// An empty registry building commands against `host`.
    pub fn new(host: Arc<dyn HostProbe>) -> Self {
        Self {
            host,
            components: Vec::new(),
            groups: BTreeMap::new(),
            manage: Vec::new(),
        }
    }

    /// An empty registry for the machine this process runs on.
    pub fn for_system() -> Self {
        Self::new(Arc::new(SystemHost))
    }

    pub fn host(&self) -> &dyn HostProbe {
        self.host.as_ref()
    }

    /// Register `component` and its commands.
    ///
    /// A component with the same name is replaced along with its commands.
    pub fn register_component(&mut self, component: SoftwareComponent) -> Arc<SoftwareComponent> {
        let component = Arc::new(component);
        let name = component.name().to_string();

        if self.remove(&name) {
            debug!("Replacing registered component '{}'", name);
        }
        trace!("Registering component '{}'", name);

        let mut manage = CommandGroup::new(name.clone(), component.help());
        for command in component.commands() {
            let command_type = command.command_type();
            manage
                .commands
                .push(command.build(&component, self.host.as_ref(), Some(command_type.as_str())));
            self.add_command(command.build(&component, self.host.as_ref(), None));
        }
        self.manage.push(manage);
        self.components.push(Arc::clone(&component));
        component
    }

    /// Append a built command to the bucket of its type.
    pub fn add_command(&mut self, command: BuiltCommand) {
        let command_type = command.command_type();
        self.groups
            .entry(command_type)
            .or_insert_with(|| CommandGroup::new(command_type.as_str(), command_type.group_help()))
            .commands
            .push(command);
    }

    fn remove(&mut self, name: &str) -> bool {
        let before = self.components.len();
        self.components.retain(|c| c.name() != name);
        if self.components.len() == before {
            return false;
        }
        self.manage.retain(|g| g.name != name);
        for group in self.groups.values_mut() {
            group.commands.retain(|c| c.component().name() != name);
        }
        self.groups.retain(|_, group| !group.is_empty());
        true
    }

    pub fn find_component(&self, name: &str) -> Option<Arc<SoftwareComponent>> {
        self.components.iter().find(|c| c.name() == name).cloned()
    }

    /// Registered components in registration order.
    pub fn components(&self) -> &[Arc<SoftwareComponent>] {
        &self.components
    }

    /// The bucket of commands of `command_type`, if any were registered.
    pub fn command_group(&self, command_type: CommandType) -> Option<&CommandGroup> {
        self.groups.get(&command_type)
    }

    /// The manage group of the component `name`.
    pub fn manage_group(&self, name: &str) -> Option<&CommandGroup> {
        self.manage.iter().find(|g| g.name == name)
    }

    /// The full command tree: `manage <component> <type>` followed by one
    /// `<type> <component>` group per registered command type.
    pub fn command_tree(&self) -> Vec<CommandNode> {
        let mut tree = Vec::new();
        if !self.manage.is_empty() {
            tree.push(CommandNode::Group {
                name: CommandType::Manage.as_str().to_string(),
                help: CommandType::Manage.group_help(),
                children: self.manage.iter().map(CommandNode::from).collect(),
            });
        }
        tree.extend(self.groups.values().map(CommandNode::from));
        tree
    }

    /// Find a built command by its path in the command tree.
    pub fn find_command(&self, path: &[&str]) -> Option<&BuiltCommand> {
        match path {
            [manage, component, command] if *manage == CommandType::Manage.as_str() => {
                self.manage_group(component)?.find(command)
            }
            [group, component] => {
                let command_type = group.parse::<CommandType>().ok()?;
                self.command_group(command_type)?.find(component)
            }
            _ => None,
        }
    }

    /// Forget every component and command.
    pub fn reset(&mut self) {
        self.components.clear();
        self.groups.clear();
        self.manage.clear();
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::for_system()
    }
}

static GLOBAL: OnceLock<RwLock<Registry>> = OnceLock::new();

fn global_lock() -> &'static RwLock<Registry> {
    GLOBAL.get_or_init(|| RwLock::new(Registry::for_system()))
}

/// Read access to the process-wide registry.
pub fn global() -> RwLockReadGuard<'static, Registry> {
    global_lock()
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Write access to the process-wide registry.
pub fn global_mut() -> RwLockWriteGuard<'static, Registry> {
    global_lock()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Clear the process-wide registry.
pub fn reset_global() {
    global_mut().reset();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Action, Command, CommandContext};
    use crate::error::Result;
    use crate::platform::{OperatingSystem, PlatformSupportChecker, StaticHost};

    struct Echo;

    impl Action for Echo {
        fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
            ctx.runner.run("echo")?;
            Ok(())
        }
    }

    fn component(name: &str, types: &[CommandType]) -> SoftwareComponent {
        let mut component = SoftwareComponent::new(name);
        for ty in types {
            component.add_command(Command::new(*ty, name, Echo), false);
        }
        component
    }

    fn registry() -> Registry {
        Registry::new(Arc::new(StaticHost::new(OperatingSystem::Linux)))
    }

    #[test]
    fn buckets_are_created_on_first_use() {
        let mut registry = registry();
        assert!(registry.command_group(CommandType::Install).is_none());

        registry.register_component(component("git", &[CommandType::Install]));

        let install = registry.command_group(CommandType::Install).unwrap();
        assert_eq!(install.help, "Install software components.");
        assert_eq!(install.commands.len(), 1);
        assert_eq!(install.commands[0].name(), "git");
        assert!(registry.command_group(CommandType::Verify).is_none());
    }

    #[test]
    fn manage_group_holds_every_command_by_type() {
        let mut registry = registry();
        registry.register_component(component(
            "git",
            &[CommandType::Install, CommandType::Configure],
        ));

        let group = registry.manage_group("git").unwrap();
        let names: Vec<&str> = group.commands.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["install", "configure"]);
        assert_eq!(group.help, "Manage the git software component.");
    }

    #[test]
    fn command_tree_layout() {
        let mut registry = registry();
        registry.register_component(component("git", &[CommandType::Install, CommandType::Verify]));
        registry.register_component(component("dive", &[CommandType::Install]));

        let tree = registry.command_tree();
        let top: Vec<&str> = tree.iter().map(|n| n.name()).collect();
        assert_eq!(top, ["manage", "install", "verify"]);

        let install = CommandNode::resolve(&tree, &["install"]).unwrap();
        let names: Vec<&str> = install.children().iter().map(|n| n.name()).collect();
        assert_eq!(names, ["git", "dive"]);

        assert!(CommandNode::resolve(&tree, &["manage", "git", "verify"]).is_some());
        assert!(CommandNode::resolve(&tree, &["manage", "dive", "verify"]).is_none());
    }

    #[test]
    fn find_command_paths() {
        let mut registry = registry();
        registry.register_component(component("git", &[CommandType::Install]));

        assert!(registry.find_command(&["install", "git"]).is_some());
        assert!(registry.find_command(&["manage", "git", "install"]).is_some());
        assert!(registry.find_command(&["install", "dive"]).is_none());
        assert!(registry.find_command(&["deploy", "git"]).is_none());
        assert!(registry.find_command(&["install"]).is_none());
    }

    #[test]
    fn reregistering_replaces_component_and_commands() {
        let mut registry = registry();
        registry.register_component(component("git", &[CommandType::Install, CommandType::Verify]));
        registry.register_component(component("git", &[CommandType::Configure]));

        assert_eq!(registry.components().len(), 1);
        assert!(registry.command_group(CommandType::Install).is_none());
        assert!(registry.command_group(CommandType::Verify).is_none());
        assert_eq!(
            registry
                .command_group(CommandType::Configure)
                .unwrap()
                .commands
                .len(),
            1
        );
        assert_eq!(registry.manage_group("git").unwrap().commands.len(), 1);
    }

    #[test]
    fn commands_are_built_against_registry_host() {
        let mut registry = registry();
        let windows_only = component("choco", &[CommandType::Install]).with_requirements(|host: &dyn HostProbe| {
            PlatformSupportChecker::new(host)
                .check_operating_system(&[OperatingSystem::Windows])
                .into_issues()
        });
        registry.register_component(windows_only);

        let built = registry.find_command(&["install", "choco"]).unwrap();
        assert!(!built.is_supported());
    }

    #[test]
    fn reset_clears_everything() {
        let mut registry = registry();
        registry.register_component(component("git", &[CommandType::Install]));
        registry.reset();

        assert!(registry.components().is_empty());
        assert!(registry.command_tree().is_empty());
    }

    #[test]
    fn global_registry_can_be_reset() {
        global_mut().register_component(component("global-test-component", &[CommandType::Verify]));
        assert!(global().find_component("global-test-component").is_some());

        reset_global();
        assert!(global().find_component("global-test-component").is_none());
    }
}
