//! Package manager strategies.
//!
//! Managers never touch the host directly: they issue commands through the
//! [`CommandRunner`] they are given, so the same manager works locally and
//! inside a working container.

pub mod managers;

pub use managers::{Apt, Choco, Dnf, LiteralManager, Pip, Sdkman, Yum};

use std::sync::Arc;

use tracing::{debug, trace};

use crate::error::{Result, StackwrightError};
use crate::runner::CommandRunner;

/// The manager name that requests probing for the system package manager.
pub const SYSTEM_MANAGER: &str = "system";

/// A packaging tool that can install named packages.
pub trait PackageManager: Send + Sync {
    /// Name used in manifests, e.g. `apt`.
    fn name(&self) -> &str;

    /// Executable whose presence on a target means this manager is usable.
    fn probe_command(&self) -> &str {
        self.name()
    }

    /// Install `packages` through `runner`.
    fn install(&self, packages: &[String], runner: &mut dyn CommandRunner) -> Result<()>;

    /// Remove caches left behind by installs.
    fn clean(&self, _runner: &mut dyn CommandRunner) -> Result<()> {
        Ok(())
    }

    /// Refresh package metadata.
    fn refresh(&self, _runner: &mut dyn CommandRunner) -> Result<()> {
        Ok(())
    }
}

/// Ordered set of known package managers.
pub struct PackageManagers {
    managers: Vec<Arc<dyn PackageManager>>,
    system_candidates: Vec<String>,
}

impl PackageManagers {
    /// An empty set with no system candidates.
    pub fn empty() -> Self {
        Self {
            managers: Vec::new(),
            system_candidates: Vec::new(),
        }
    }

    /// The built-in managers, probing `apt`, `dnf`, `yum`, `choco` for `system`.
    pub fn builtin() -> Self {
        let mut managers = Self::empty();
        managers.register(Arc::new(Apt), true);
        managers.register(Arc::new(Dnf), true);
        managers.register(Arc::new(Yum), true);
        managers.register(Arc::new(Choco), true);
        managers.register(Arc::new(Pip), false);
        managers.register(Arc::new(Sdkman), false);
        managers
    }

    /// Register `manager`; `system` managers take part in system probing in
    /// registration order.
    pub fn register(&mut self, manager: Arc<dyn PackageManager>, system: bool) {
        let name = manager.name().to_string();
        self.managers.retain(|m| m.name() != name);
        self.system_candidates.retain(|n| n != &name);
        if system {
            self.system_candidates.push(name);
        }
        self.managers.push(manager);
    }

    pub fn find(&self, name: &str) -> Option<Arc<dyn PackageManager>> {
        self.managers.iter().find(|m| m.name() == name).cloned()
    }

    pub fn names(&self) -> Vec<&str> {
        self.managers.iter().map(|m| m.name()).collect()
    }

    /// Managers probed for `system`, in probing order.
    pub fn system_candidates(&self) -> &[String] {
        &self.system_candidates
    }

    /// Pick the first system candidate whose probe command exists on the target.
    pub fn detect_system(&self, runner: &mut dyn CommandRunner) -> Result<Arc<dyn PackageManager>> {
        for name in &self.system_candidates {
            let Some(manager) = self.find(name) else {
                continue;
            };
            trace!("Probing for '{}' on {}", manager.probe_command(), runner.target());
            if runner.check_command(manager.probe_command()) {
                debug!("Using '{}' as system package manager", name);
                return Ok(manager);
            }
        }
        Err(StackwrightError::PackageManagerUnavailable {
            manager: SYSTEM_MANAGER.to_string(),
            tried: self.system_candidates.clone(),
        })
    }

    /// Resolve the manager for a package group.
    ///
    /// `system` probes the target. Other names must be registered unless the
    /// group supplies a literal `install_command`.
    pub fn resolve(
        &self,
        name: &str,
        install_command: Option<&str>,
        runner: &mut dyn CommandRunner,
    ) -> Result<Arc<dyn PackageManager>> {
        if name == SYSTEM_MANAGER {
            return self.detect_system(runner);
        }
        if let Some(manager) = self.find(name) {
            return Ok(manager);
        }
        match install_command {
            Some(command) => Ok(Arc::new(LiteralManager::new(name, command))),
            None => Err(StackwrightError::PackageManagerUnavailable {
                manager: name.to_string(),
                tried: Vec::new(),
            }),
        }
    }
}

impl Default for PackageManagers {
    fn default() -> Self {
        Self::builtin()
    }
}
