use super::NativePlugin;
use crate::component::{Action, Command, CommandContext, CommandType, SoftwareComponent};
use crate::error::Result;
use crate::platform::{HostProbe, OperatingSystem, PlatformIssue, PlatformSupportChecker};

const INSTALL_SCRIPT: &str = "https://community.chocolatey.org/install.ps1";

/// Chocolatey, the package manager for Windows.
pub struct ChocolateyPlugin;

impl NativePlugin for ChocolateyPlugin {
    fn id(&self) -> &'static str {
        "chocolatey"
    }

    fn build(&self, name: &str) -> Result<SoftwareComponent> {
        let mut component = SoftwareComponent::native(name, self.id())
            .with_description("Manage Chocolatey, the package manager for Windows.")
            .with_requirements(requirements);
        component.add_command(Command::new(CommandType::Install, name, Install), false);
        component.add_command(Command::new(CommandType::Update, name, Update), false);
        Ok(component)
    }
}

fn requirements(host: &dyn HostProbe) -> Vec<PlatformIssue> {
    PlatformSupportChecker::new(host)
        .check_operating_system(&[OperatingSystem::Windows])
        .check_command_is_available("powershell", false, None)
        .into_issues()
}

struct Install;

impl Action for Install {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.runner.run(&format!(
            "powershell -NoProfile -ExecutionPolicy Bypass -Command \"[System.Net.ServicePointManager]::SecurityProtocol = 3072; iex ((New-Object System.Net.WebClient).DownloadString('{}'))\"",
            INSTALL_SCRIPT
        ))?;
        Ok(())
    }

    fn help(&self) -> Option<String> {
        Some("Install Chocolatey.".to_string())
    }
}

struct Update;

impl Action for Update {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        ctx.runner.run("choco upgrade chocolatey --yes")?;
        Ok(())
    }

    fn supports_platform(&self, host: &dyn HostProbe) -> Vec<PlatformIssue> {
        PlatformSupportChecker::new(host)
            .check_command_is_available("choco", true, Some("install choco"))
            .into_issues()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticHost;

    #[test]
    fn linux_hosts_are_unsupported() {
        let component = ChocolateyPlugin.build("chocolatey").unwrap();
        let host = StaticHost::new(OperatingSystem::Linux);
        let issues = component.supports_platform(&host);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].description, "Linux is not supported, only Windows is!");
    }

    #[test]
    fn update_requires_choco() {
        let component = std::sync::Arc::new(ChocolateyPlugin.build("chocolatey").unwrap());
        let host = StaticHost::new(OperatingSystem::Windows).with_commands(["powershell"]);
        let update = component
            .build_command(CommandType::Update, &host, None)
            .unwrap();
        let install = component
            .build_command(CommandType::Install, &host, None)
            .unwrap();

        assert!(install.is_supported());
        assert!(!update.is_supported());
        assert_eq!(update.issues()[0].fix_instructions.as_deref(), Some("install choco"));
    }
}
