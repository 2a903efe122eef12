use std::collections::BTreeMap;

use serde::Deserialize;
use tracing::{debug, info};

use super::NativePlugin;
use crate::component::{Action, Command, CommandContext, CommandType, SoftwareComponent};
use crate::error::{Result, StackwrightError};
use crate::packages::PackageManagers;
use crate::platform::{HostProbe, PlatformIssue, PlatformSupportChecker};

/// Git, installed through the system package manager.
pub struct GitPlugin;

impl NativePlugin for GitPlugin {
    fn id(&self) -> &'static str {
        "git"
    }

    fn build(&self, name: &str) -> Result<SoftwareComponent> {
        let mut component = SoftwareComponent::native(name, self.id())
            .with_description("Install or configure Git on your machine.");
        component.add_command(Command::new(CommandType::Install, name, Install), false);
        component.add_command(Command::new(CommandType::Configure, name, Configure), false);
        component.add_command(Command::new(CommandType::Verify, name, Verify), false);
        Ok(component)
    }
}

fn requires_git(host: &dyn HostProbe) -> Vec<PlatformIssue> {
    PlatformSupportChecker::new(host)
        .check_command_is_available("git", true, Some("install git first"))
        .into_issues()
}

struct Install;

impl Action for Install {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let manager = PackageManagers::builtin().detect_system(ctx.runner)?;
        info!("Installing Git with {}", manager.name());
        manager.install(&["git".to_string()], ctx.runner)
    }

    fn help(&self) -> Option<String> {
        Some("Install Git.".to_string())
    }
}

/// `config.yml` next to the component: `git_settings: {user.name: ...}`.
#[derive(Debug, Default, Deserialize)]
struct GitConfigFile {
    #[serde(default)]
    git_settings: BTreeMap<String, String>,
}

struct Configure;

impl Action for Configure {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let Some(path) = ctx.component.get_file("config.yml") else {
            info!("No config.yml for '{}', nothing to configure", ctx.component.name());
            return Ok(());
        };

        let content = std::fs::read_to_string(path)?;
        let config: GitConfigFile =
            serde_yaml::from_str(&content).map_err(|e| StackwrightError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        for (key, value) in &config.git_settings {
            debug!("Setting git config '{}'", key);
            ctx.runner
                .run(&format!("git config --global {} \"{}\"", key, value.replace('"', "\\\"")))?;
        }
        Ok(())
    }

    fn supports_platform(&self, host: &dyn HostProbe) -> Vec<PlatformIssue> {
        requires_git(host)
    }

    fn help(&self) -> Option<String> {
        Some("Configure Git.".to_string())
    }
}

struct Verify;

impl Action for Verify {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.runner.run("git --version")?;
        Ok(())
    }

    fn supports_platform(&self, host: &dyn HostProbe) -> Vec<PlatformIssue> {
        requires_git(host)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{OperatingSystem, StaticHost};
    use crate::runner::RecordingRunner;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn install_uses_detected_system_manager() {
        let component = Arc::new(GitPlugin.build("git").unwrap());
        let host = StaticHost::new(OperatingSystem::Linux);
        let mut runner = RecordingRunner::new().with_available(["dnf"]);

        component
            .build_command(CommandType::Install, &host, None)
            .unwrap()
            .invoke(&mut runner)
            .unwrap();

        assert_eq!(runner.commands(), ["dnf install -y git"]);
    }

    #[test]
    fn configure_applies_settings_from_config_file() {
        let temp = TempDir::new().unwrap();
        let config = temp.path().join("config.yml");
        std::fs::write(
            &config,
            "git_settings:\n  user.name: Jane Doe\n  pull.rebase: \"true\"\n",
        )
        .unwrap();

        let mut component = GitPlugin.build("git").unwrap();
        component.add_file(&config);
        let component = Arc::new(component);
        let host = StaticHost::new(OperatingSystem::Linux).with_commands(["git"]);
        let mut runner = RecordingRunner::new();

        component
            .build_command(CommandType::Configure, &host, None)
            .unwrap()
            .invoke(&mut runner)
            .unwrap();

        assert_eq!(
            runner.commands(),
            [
                "git config --global pull.rebase \"true\"",
                "git config --global user.name \"Jane Doe\""
            ]
        );
    }

    #[test]
    fn configure_needs_git() {
        let component = Arc::new(GitPlugin.build("git").unwrap());
        let host = StaticHost::new(OperatingSystem::Linux);
        let built = component
            .build_command(CommandType::Configure, &host, None)
            .unwrap();
        assert!(!built.is_supported());
        assert_eq!(built.issues()[0].fix_instructions.as_deref(), Some("install git first"));
    }
}
