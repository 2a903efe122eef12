//! Fluent platform support checker.

use super::{HostProbe, OperatingSystem, PlatformIssue};

/// Accumulates platform issues across a chain of independent checks.
pub struct PlatformSupportChecker<'a> {
    host: &'a dyn HostProbe,
    issues: Vec<PlatformIssue>,
}

impl<'a> PlatformSupportChecker<'a> {
    /// Start a check chain against `host`.
    pub fn new(host: &'a dyn HostProbe) -> Self {
        Self {
            host,
            issues: Vec::new(),
        }
    }

    /// The host being checked.
    pub fn host(&self) -> &dyn HostProbe {
        self.host
    }

    /// Require one of the given operating systems.
    pub fn check_operating_system(mut self, supported: &[OperatingSystem]) -> Self {
        let current = self.host.operating_system();
        if !supported.contains(&current) {
            self.issues
                .push(PlatformIssue::unsupported_operating_system(current, supported));
        }
        self
    }

    /// Require `command` to be on `PATH`.
    pub fn check_command_is_available(
        mut self,
        command: &str,
        fixable: bool,
        instructions: Option<&str>,
    ) -> Self {
        if !self.host.has_command(command) {
            self.issues.push(PlatformIssue::command_not_available(
                command,
                fixable,
                instructions,
            ));
        }
        self
    }

    /// Require an optional capability compiled into the binary.
    pub fn check_capability_is_available(
        mut self,
        capability: &str,
        description: Option<&str>,
        fixable: bool,
        fix_instructions: Option<&str>,
    ) -> Self {
        if !self.host.has_capability(capability) {
            self.issues.push(PlatformIssue {
                description: description.map(str::to_string).unwrap_or_else(|| {
                    format!("Required capability '{}' is unavailable!", capability)
                }),
                fixable,
                fix_instructions: fix_instructions.map(str::to_string),
            });
        }
        self
    }

    /// Require root privileges.
    pub fn check_root_privileges(mut self) -> Self {
        if !self.host.is_elevated() {
            self.issues.push(
                PlatformIssue::new("This action requires root privileges!")
                    .with_fix("run the command as root"),
            );
        }
        self
    }

    /// Issues accumulated so far.
    pub fn issues(&self) -> &[PlatformIssue] {
        &self.issues
    }

    /// Finish the chain and take the accumulated issues.
    pub fn into_issues(self) -> Vec<PlatformIssue> {
        self.issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::StaticHost;

    fn linux() -> StaticHost {
        StaticHost::new(OperatingSystem::Linux).with_commands(["bash", "curl"])
    }

    #[test]
    fn no_issues_when_everything_is_available() {
        let host = linux();
        let checker = PlatformSupportChecker::new(&host)
            .check_operating_system(&[OperatingSystem::Linux, OperatingSystem::MacOS])
            .check_command_is_available("bash", true, None)
            .check_command_is_available("curl", true, None);
        assert!(checker.issues().is_empty());
    }

    #[test]
    fn collects_issues_from_every_failed_check() {
        let host = linux();
        let issues = PlatformSupportChecker::new(&host)
            .check_operating_system(&[OperatingSystem::Windows])
            .check_command_is_available("choco", true, Some("install choco"))
            .check_capability_is_available("github", None, false, None)
            .check_root_privileges()
            .into_issues();

        assert_eq!(issues.len(), 4);
        assert_eq!(issues[0].description, "Linux is not supported, only Windows is!");
        assert_eq!(issues[1].fix_instructions.as_deref(), Some("install choco"));
        assert!(issues[2].description.contains("'github'"));
        assert!(issues[3].description.contains("root"));
    }

    #[test]
    fn check_order_does_not_change_the_issue_set() {
        let host = linux();
        let mut forward = PlatformSupportChecker::new(&host)
            .check_command_is_available("zip", true, None)
            .check_operating_system(&[OperatingSystem::Windows])
            .into_issues();
        let mut backward = PlatformSupportChecker::new(&host)
            .check_operating_system(&[OperatingSystem::Windows])
            .check_command_is_available("zip", true, None)
            .into_issues();

        forward.sort_by(|a, b| a.description.cmp(&b.description));
        backward.sort_by(|a, b| a.description.cmp(&b.description));
        assert_eq!(forward, backward);
    }

    #[test]
    fn identical_checks_on_identical_hosts_agree() {
        let run = |host: &StaticHost| {
            PlatformSupportChecker::new(host)
                .check_command_is_available("unzip", true, None)
                .into_issues()
        };
        assert_eq!(run(&linux()), run(&linux()));
    }

    #[test]
    fn capability_uses_custom_description() {
        let host = linux().with_capabilities(["github"]);
        let issues = PlatformSupportChecker::new(&host)
            .check_capability_is_available("github", Some("GitHub support missing"), true, None)
            .check_capability_is_available("ansible", Some("Ansible support missing"), true, None)
            .into_issues();
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].description, "Ansible support missing");
    }
}
