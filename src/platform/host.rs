//! Host state probes.

use std::collections::HashSet;

use super::OperatingSystem;

/// Read-only view of the machine a command would run on.
pub trait HostProbe: Send + Sync {
    /// The host operating system.
    fn operating_system(&self) -> OperatingSystem;

    /// Whether `command` resolves to an executable on `PATH`.
    fn has_command(&self, command: &str) -> bool;

    /// Whether an optional, compiled-in capability is available.
    fn has_capability(&self, capability: &str) -> bool;

    /// Whether the current user has root privileges.
    fn is_elevated(&self) -> bool;
}

/// Capabilities compiled into this binary.
pub fn compiled_capabilities() -> Vec<&'static str> {
    let mut capabilities = Vec::new();
    if cfg!(feature = "github") {
        capabilities.push("github");
    }
    capabilities
}

/// Probes the machine this process runs on.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemHost;

impl HostProbe for SystemHost {
    fn operating_system(&self) -> OperatingSystem {
        OperatingSystem::current()
    }

    fn has_command(&self, command: &str) -> bool {
        which::which(command).is_ok()
    }

    fn has_capability(&self, capability: &str) -> bool {
        compiled_capabilities().contains(&capability)
    }

    #[cfg(unix)]
    fn is_elevated(&self) -> bool {
        // SAFETY: geteuid has no preconditions and cannot fail.
        unsafe { libc::geteuid() == 0 }
    }

    #[cfg(not(unix))]
    fn is_elevated(&self) -> bool {
        tracing::error!("Unable to determine if executing user has root privileges");
        false
    }
}

/// A fixed host description, for tests and dry runs.
#[derive(Debug, Clone)]
pub struct StaticHost {
    os: OperatingSystem,
    commands: HashSet<String>,
    capabilities: HashSet<String>,
    elevated: bool,
}

impl StaticHost {
    /// A host running `os` with nothing installed.
    pub fn new(os: OperatingSystem) -> Self {
        Self {
            os,
            commands: HashSet::new(),
            capabilities: HashSet::new(),
            elevated: false,
        }
    }

    /// Add commands available on `PATH`.
    pub fn with_commands<I, S>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.commands.extend(commands.into_iter().map(Into::into));
        self
    }

    /// Add available capabilities.
    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities
            .extend(capabilities.into_iter().map(Into::into));
        self
    }

    /// Set whether the user has root privileges.
    pub fn elevated(mut self, elevated: bool) -> Self {
        self.elevated = elevated;
        self
    }
}

impl HostProbe for StaticHost {
    fn operating_system(&self) -> OperatingSystem {
        self.os
    }

    fn has_command(&self, command: &str) -> bool {
        self.commands.contains(command)
    }

    fn has_capability(&self, capability: &str) -> bool {
        self.capabilities.contains(capability)
    }

    fn is_elevated(&self) -> bool {
        self.elevated
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_host_reports_current_os() {
        assert_eq!(SystemHost.operating_system(), OperatingSystem::current());
    }

    #[test]
    fn system_host_misses_nonexistent_command() {
        assert!(!SystemHost.has_command("this-command-does-not-exist-12345"));
    }

    #[test]
    fn system_host_knows_compiled_capabilities() {
        for capability in compiled_capabilities() {
            assert!(SystemHost.has_capability(capability));
        }
        assert!(!SystemHost.has_capability("not-a-capability"));
    }

    #[test]
    fn static_host_answers_from_its_description() {
        let host = StaticHost::new(OperatingSystem::Windows)
            .with_commands(["choco"])
            .with_capabilities(["github"])
            .elevated(true);

        assert_eq!(host.operating_system(), OperatingSystem::Windows);
        assert!(host.has_command("choco"));
        assert!(!host.has_command("apt"));
        assert!(host.has_capability("github"));
        assert!(host.is_elevated());
    }
}
