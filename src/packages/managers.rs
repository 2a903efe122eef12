//! Built-in package managers.

use crate::error::Result;
use crate::runner::CommandRunner;

use super::PackageManager;

#[derive(Debug, Clone, Copy, Default)]
pub struct Apt;

impl PackageManager for Apt {
    fn name(&self) -> &str {
        "apt"
    }

    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()> {
        self.refresh(runner)?;
        runner.run(&format!(
            "apt install -y --no-install-recommends {}",
            packages.join(" ")
        ))?;
        Ok(())
    }

    fn clean(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        runner.run("apt clean").map(|_| ())
    }

    fn refresh(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        runner.run("apt update").map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Dnf;

impl PackageManager for Dnf {
    fn name(&self) -> &str {
        "dnf"
    }

    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()> {
        runner
            .run(&format!("dnf install -y {}", packages.join(" ")))
            .map(|_| ())
    }

    fn clean(&self, runner: &mut dyn CommandRunner) -> Result<()> {
        runner.run("dnf clean all").map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Yum;

impl PackageManager for Yum {
    fn name(&self) -> &str {
        "yum"
    }

    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()> {
        runner
            .run(&format!("yum install -y {}", packages.join(" ")))
            .map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Pip;

impl PackageManager for Pip {
    fn name(&self) -> &str {
        "pip"
    }

    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()> {
        runner
            .run(&format!("pip install {}", packages.join(" ")))
            .map(|_| ())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Choco;

impl PackageManager for Choco {
    fn name(&self) -> &str {
        "choco"
    }

    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()> {
        runner
            .run(&format!("choco install --yes {}", packages.join(" ")))
            .map(|_| ())
    }
}

/// SDKMAN, the Software Development Kit Manager.
///
/// `sdk` is a shell function, so every install sources the init script first.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sdkman;

impl Sdkman {
    pub const INIT_SCRIPT: &'static str = "$HOME/.sdkman/bin/sdkman-init.sh";
}

impl PackageManager for Sdkman {
    fn name(&self) -> &str {
        "sdk"
    }

    fn probe_command(&self) -> &str {
        "bash"
    }

    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()> {
        let mut script = format!("source \"{}\"", Self::INIT_SCRIPT);
        for package in packages {
            script.push_str(&format!(" && sdk install {}", package));
        }
        runner
            .run(&format!("bash -c '{}'", script))
            .map(|_| ())
    }
}

/// A manager with no built-in strategy, driven by a literal install command.
#[derive(Debug, Clone)]
pub struct LiteralManager {
    name: String,
    install_command: String,
}

impl LiteralManager {
    pub fn new(name: impl Into<String>, install_command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            install_command: install_command.into(),
        }
    }
}

impl PackageManager for LiteralManager {
    fn name(&self) -> &str {
        &self.name
    }

    fn probe_command(&self) -> &str {
        self.install_command
            .split_whitespace()
            .next()
            .unwrap_or(&self.name)
    }

    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()> {
        runner
            .run(&format!("{} {}", self.install_command, packages.join(" ")))
            .map(|_| ())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::RecordingRunner;

    fn packages(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn apt_refreshes_before_install() {
        let mut runner = RecordingRunner::new();
        Apt.install(&packages(&["git", "curl"]), &mut runner).unwrap();
        assert_eq!(
            runner.commands(),
            ["apt update", "apt install -y --no-install-recommends git curl"]
        );
    }

    #[test]
    fn sdkman_sources_init_script() {
        let mut runner = RecordingRunner::new();
        Sdkman
            .install(&packages(&["java 17.0.2-open", "maven"]), &mut runner)
            .unwrap();
        let command = &runner.commands()[0];
        assert!(command.starts_with("bash -c 'source \"$HOME/.sdkman/bin/sdkman-init.sh\""));
        assert!(command.contains("&& sdk install java 17.0.2-open && sdk install maven"));
    }

    #[test]
    fn default_clean_and_refresh_do_nothing() {
        let mut runner = RecordingRunner::new();
        Yum.clean(&mut runner).unwrap();
        Yum.refresh(&mut runner).unwrap();
        assert!(runner.commands().is_empty());
        Dnf.clean(&mut runner).unwrap();
        assert_eq!(runner.commands(), ["dnf clean all"]);
    }

    #[test]
    fn literal_manager_probes_first_word() {
        let manager = LiteralManager::new("brew", "brew install --quiet");
        assert_eq!(manager.probe_command(), "brew");
    }
}
