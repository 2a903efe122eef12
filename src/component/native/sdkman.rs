use super::NativePlugin;
use crate::component::{Action, Command, CommandContext, CommandType, SoftwareComponent};
use crate::error::Result;
use crate::packages::Sdkman;
use crate::platform::{HostProbe, OperatingSystem, PlatformSupportChecker};

/// SDKMAN, the Software Development Kit Manager (<https://sdkman.io>).
pub struct SdkmanPlugin;

impl NativePlugin for SdkmanPlugin {
    fn id(&self) -> &'static str {
        "sdkman"
    }

    fn build(&self, name: &str) -> Result<SoftwareComponent> {
        let mut component = SoftwareComponent::native(name, self.id())
            .with_description("Manage SDKMAN, the Software Development Kit Manager.")
            .with_requirements(requirements);
        component.add_command(Command::new(CommandType::Install, name, Install), false);
        component.add_command(Command::new(CommandType::Update, name, Update), false);
        component.add_command(Command::new(CommandType::Verify, name, Verify), false);
        Ok(component)
    }
}

fn requirements(host: &dyn HostProbe) -> Vec<crate::platform::PlatformIssue> {
    let mut checker = PlatformSupportChecker::new(host)
        .check_operating_system(&[OperatingSystem::Linux, OperatingSystem::MacOS]);
    for command in ["bash", "curl", "sed", "unzip", "zip"] {
        checker = checker.check_command_is_available(command, true, None);
    }
    checker.into_issues()
}

fn sdk(command: &str) -> String {
    format!("bash -c 'source \"{}\" && sdk {}'", Sdkman::INIT_SCRIPT, command)
}

struct Install;

impl Action for Install {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.runner.run("curl -s 'https://get.sdkman.io' | bash")?;
        Ok(())
    }

    fn help(&self) -> Option<String> {
        Some("Install SDKMAN.".to_string())
    }
}

struct Update;

impl Action for Update {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.runner.run(&sdk("selfupdate"))?;
        Ok(())
    }

    fn help(&self) -> Option<String> {
        Some("Update SDKMAN to the latest version.".to_string())
    }
}

struct Verify;

impl Action for Verify {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.runner.run(&sdk("version"))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticHost;
    use crate::runner::RecordingRunner;
    use std::sync::Arc;

    #[test]
    fn requires_unix_tools() {
        let component = SdkmanPlugin.build("sdkman").unwrap();
        let host = StaticHost::new(OperatingSystem::Linux).with_commands(["bash", "curl"]);
        let issues = component.supports_platform(&host);
        assert_eq!(issues.len(), 3);
        assert!(issues.iter().all(|i| i.fixable));
    }

    #[test]
    fn windows_is_unsupported() {
        let component = SdkmanPlugin.build("sdkman").unwrap();
        let host = StaticHost::new(OperatingSystem::Windows)
            .with_commands(["bash", "curl", "sed", "unzip", "zip"]);
        let issues = component.supports_platform(&host);
        assert_eq!(issues.len(), 1);
        assert!(issues[0].description.starts_with("Windows is not supported"));
    }

    #[test]
    fn install_pipes_installer_to_bash() {
        let component = Arc::new(SdkmanPlugin.build("sdkman").unwrap());
        let host = StaticHost::new(OperatingSystem::Linux)
            .with_commands(["bash", "curl", "sed", "unzip", "zip"]);
        let mut runner = RecordingRunner::new();

        component
            .build_command(CommandType::Install, &host, None)
            .unwrap()
            .invoke(&mut runner)
            .unwrap();

        assert_eq!(runner.commands(), ["curl -s 'https://get.sdkman.io' | bash"]);
    }
}
