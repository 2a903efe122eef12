//! Component commands and their built, runnable form.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use tracing::{debug, info};

use super::SoftwareComponent;
use crate::error::{Result, StackwrightError};
use crate::platform::{HostProbe, PlatformIssue};
use crate::runner::CommandRunner;

/// The lifecycle operation a command performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CommandType {
    Manage,
    Install,
    Uninstall,
    Update,
    Configure,
    Verify,
}

impl CommandType {
    /// Every command type, `Manage` first.
    pub const ALL: [CommandType; 6] = [
        CommandType::Manage,
        CommandType::Install,
        CommandType::Uninstall,
        CommandType::Update,
        CommandType::Configure,
        CommandType::Verify,
    ];

    /// The types a component can own a command for.
    pub const LIFECYCLE: [CommandType; 5] = [
        CommandType::Install,
        CommandType::Uninstall,
        CommandType::Update,
        CommandType::Configure,
        CommandType::Verify,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CommandType::Manage => "manage",
            CommandType::Install => "install",
            CommandType::Uninstall => "uninstall",
            CommandType::Update => "update",
            CommandType::Configure => "configure",
            CommandType::Verify => "verify",
        }
    }

    /// Help text for the group collecting commands of this type.
    pub fn group_help(&self) -> String {
        format!("{} software components.", capitalize(self.as_str()))
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for CommandType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CommandType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown command type '{}'", s))
    }
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// What a command needs while it executes.
pub struct CommandContext<'a> {
    /// The component owning the command.
    pub component: &'a SoftwareComponent,
    /// Where shell commands go.
    pub runner: &'a mut dyn CommandRunner,
}

/// The body of a command.
pub trait Action: Send + Sync {
    /// Perform the operation.
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()>;

    /// Requirements of this action beyond those of its component.
    fn supports_platform(&self, _host: &dyn HostProbe) -> Vec<PlatformIssue> {
        Vec::new()
    }

    /// Help text shown for the command.
    fn help(&self) -> Option<String> {
        None
    }
}

/// A typed command owned by exactly one component.
#[derive(Clone)]
pub struct Command {
    command_type: CommandType,
    parent: String,
    action: Arc<dyn Action>,
}

impl Command {
    /// Create a command of `command_type` for the component named `parent`.
    pub fn new(command_type: CommandType, parent: impl Into<String>, action: impl Action + 'static) -> Self {
        Self::from_action(command_type, parent, Arc::new(action))
    }

    pub fn from_action(
        command_type: CommandType,
        parent: impl Into<String>,
        action: Arc<dyn Action>,
    ) -> Self {
        Self {
            command_type,
            parent: parent.into(),
            action,
        }
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    /// Name of the owning component.
    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn help(&self) -> String {
        self.action.help().unwrap_or_else(|| {
            format!(
                "{} the {} software component.",
                capitalize(self.command_type.as_str()),
                self.parent
            )
        })
    }

    /// Issues preventing this command from running on `host`.
    pub fn platform_issues(&self, parent: &SoftwareComponent, host: &dyn HostProbe) -> Vec<PlatformIssue> {
        let mut issues = parent.supports_platform(host);
        issues.extend(self.action.supports_platform(host));
        issues
    }

    /// Build the runnable form of this command.
    ///
    /// If the host has any platform issues, the result is a stub that reports
    /// them when invoked and never executes the action. The command is named
    /// after its component unless `name` is given.
    pub fn build(
        &self,
        parent: &Arc<SoftwareComponent>,
        host: &dyn HostProbe,
        name: Option<&str>,
    ) -> BuiltCommand {
        let issues = self.platform_issues(parent, host);
        let state = if issues.is_empty() {
            BuildState::Runnable(Arc::clone(&self.action))
        } else {
            debug!(
                "The '{}' command of '{}' is unsupported on this platform ({} issues)",
                self.command_type,
                parent.name(),
                issues.len()
            );
            BuildState::Unsupported(issues)
        };

        BuiltCommand {
            name: name.unwrap_or(parent.name()).to_string(),
            help: self.help(),
            command_type: self.command_type,
            component: Arc::clone(parent),
            state,
        }
    }
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Command")
            .field("command_type", &self.command_type)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

#[derive(Clone)]
enum BuildState {
    Runnable(Arc<dyn Action>),
    Unsupported(Vec<PlatformIssue>),
}

/// A command ready to be invoked, or a stub reporting why it cannot be.
#[derive(Clone)]
pub struct BuiltCommand {
    name: String,
    help: String,
    command_type: CommandType,
    component: Arc<SoftwareComponent>,
    state: BuildState,
}

impl BuiltCommand {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn help(&self) -> &str {
        &self.help
    }

    pub fn command_type(&self) -> CommandType {
        self.command_type
    }

    pub fn component(&self) -> &Arc<SoftwareComponent> {
        &self.component
    }

    /// Whether invoking this command would run its action.
    pub fn is_supported(&self) -> bool {
        matches!(self.state, BuildState::Runnable(_))
    }

    /// The platform issues of an unsupported command.
    pub fn issues(&self) -> &[PlatformIssue] {
        match &self.state {
            BuildState::Runnable(_) => &[],
            BuildState::Unsupported(issues) => issues,
        }
    }

    /// Run the command, or report its platform issues.
    pub fn invoke(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        match &self.state {
            BuildState::Runnable(action) => {
                info!(
                    "Running the '{}' command of '{}' on {}",
                    self.command_type,
                    self.component.name(),
                    runner.target()
                );
                let mut ctx = CommandContext {
                    component: &self.component,
                    runner,
                };
                action.execute(&mut ctx)
            }
            BuildState::Unsupported(issues) => Err(StackwrightError::UnsupportedPlatform {
                component: self.component.name().to_string(),
                command: self.command_type.to_string(),
                issues: issues.clone(),
            }),
        }
    }
}

impl fmt::Debug for BuiltCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuiltCommand")
            .field("name", &self.name)
            .field("command_type", &self.command_type)
            .field("component", &self.component.name())
            .field("supported", &self.is_supported())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{OperatingSystem, StaticHost};
    use crate::runner::RecordingRunner;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting(Arc<AtomicUsize>);

    impl Action for Counting {
        fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            ctx.runner.run(&format!("echo {}", ctx.component.name()))?;
            Ok(())
        }
    }

    struct NeedsCommand(&'static str);

    impl Action for NeedsCommand {
        fn execute(&self, _ctx: &mut CommandContext<'_>) -> Result<()> {
            Ok(())
        }

        fn supports_platform(&self, host: &dyn HostProbe) -> Vec<PlatformIssue> {
            crate::platform::PlatformSupportChecker::new(host)
                .check_command_is_available(self.0, true, None)
                .into_issues()
        }
    }

    fn component_with(action: impl Action + 'static) -> Arc<SoftwareComponent> {
        let mut component = SoftwareComponent::new("demo");
        component.add_command(Command::new(CommandType::Install, "demo", action), false);
        Arc::new(component)
    }

    #[test]
    fn command_type_parses_and_displays() {
        for ty in CommandType::ALL {
            assert_eq!(ty.as_str().parse::<CommandType>().unwrap(), ty);
        }
        assert!("deploy".parse::<CommandType>().is_err());
        assert_eq!(CommandType::Install.group_help(), "Install software components.");
    }

    #[test]
    fn default_help_names_type_and_component() {
        let command = Command::new(CommandType::Verify, "git", NeedsCommand("git"));
        assert_eq!(command.help(), "Verify the git software component.");
    }

    #[test]
    fn supported_build_executes_action_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let component = component_with(Counting(Arc::clone(&calls)));
        let host = StaticHost::new(OperatingSystem::Linux);

        let built = component
            .command(CommandType::Install)
            .unwrap()
            .build(&component, &host, None);
        assert!(built.is_supported());
        assert_eq!(built.name(), "demo");

        let mut runner = RecordingRunner::new();
        built.invoke(&mut runner).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(runner.commands(), ["echo demo"]);
    }

    #[test]
    fn unsupported_build_never_executes_action() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut component = SoftwareComponent::new("demo").with_requirements(|host: &dyn HostProbe| {
            crate::platform::PlatformSupportChecker::new(host)
                .check_operating_system(&[OperatingSystem::Windows])
                .into_issues()
        });
        component.add_command(
            Command::new(CommandType::Install, "demo", Counting(Arc::clone(&calls))),
            false,
        );
        let component = Arc::new(component);
        let host = StaticHost::new(OperatingSystem::Linux);

        let built = component
            .command(CommandType::Install)
            .unwrap()
            .build(&component, &host, Some("install"));
        assert!(!built.is_supported());
        assert_eq!(built.issues().len(), 1);

        let mut runner = RecordingRunner::new();
        let err = built.invoke(&mut runner).unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(runner.commands().is_empty());
        assert!(err.to_string().contains("Linux is not supported"));
    }

    #[test]
    fn action_requirements_only_affect_their_command() {
        let mut component = SoftwareComponent::new("demo");
        component.add_command(Command::new(CommandType::Install, "demo", NeedsCommand("tar")), false);
        component.add_command(Command::new(CommandType::Verify, "demo", NeedsCommand("sh")), false);
        let component = Arc::new(component);
        let host = StaticHost::new(OperatingSystem::Linux).with_commands(["sh"]);

        let install = component
            .command(CommandType::Install)
            .unwrap()
            .build(&component, &host, None);
        let verify = component
            .command(CommandType::Verify)
            .unwrap()
            .build(&component, &host, None);

        assert!(!install.is_supported());
        assert!(verify.is_supported());
    }
}
