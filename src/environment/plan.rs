//! Deployment planning.
//!
//! A [`DeploymentPlan`] is computed completely before any step runs, so a
//! dependency or package manager problem aborts the deployment before the
//! target is touched.
//!
//! Package groups are merged per manager in first-seen order. For each
//! merged group, components it depends on are installed first and removed
//! from the remaining components, then the group's packages are installed.
//! The remaining components follow in manifest order.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace, warn};

use super::manifest::Packages;
use super::software::SoftwareEnvironment;
use crate::component::{CommandType, SoftwareComponent};
use crate::error::{Result, StackwrightError};
use crate::packages::{PackageManager, PackageManagers};
use crate::runner::CommandRunner;

/// Packages of every group targeting the same manager.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagerGroup {
    pub manager: String,
    /// Packages in first-seen order, without duplicates.
    pub packages: Vec<String>,
    /// Components the manager depends on, in first-seen order.
    pub dependencies: Vec<String>,
    /// First literal install command given for this manager.
    pub install_command: Option<String>,
}

/// Merge package groups by manager, keeping first-seen order throughout.
///
/// A package named more than once for a manager, in one group or across
/// groups and images, is installed once at its first position.
pub fn merge_package_groups(groups: &[Packages]) -> Vec<ManagerGroup> {
    let mut merged: Vec<ManagerGroup> = Vec::new();
    for group in groups {
        let index = match merged.iter().position(|m| m.manager == group.manager) {
            Some(index) => index,
            None => {
                merged.push(ManagerGroup {
                    manager: group.manager.clone(),
                    packages: Vec::new(),
                    dependencies: Vec::new(),
                    install_command: None,
                });
                merged.len() - 1
            }
        };
        let target = &mut merged[index];

        for package in &group.packages {
            if !target.packages.contains(package) {
                target.packages.push(package.clone());
            }
        }
        if let Some(dependency) = &group.dependency {
            if !target.dependencies.contains(dependency) {
                target.dependencies.push(dependency.clone());
            }
        }
        if target.install_command.is_none() {
            target.install_command = group.install_command.clone();
        }
    }
    merged
}

/// One step of a deployment.
#[derive(Clone)]
pub enum PlanStep {
    SetEnv {
        name: String,
        value: String,
    },
    InstallPackages {
        manager: Arc<dyn PackageManager>,
        packages: Vec<String>,
    },
    InstallComponent {
        component: Arc<SoftwareComponent>,
        /// Manager whose dependency this component satisfies.
        required_by: Option<String>,
    },
}

impl fmt::Display for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlanStep::SetEnv { name, value } => write!(f, "set {}={}", name, value),
            PlanStep::InstallPackages { manager, packages } => {
                write!(f, "install {} with {}", packages.join(" "), manager.name())
            }
            PlanStep::InstallComponent {
                component,
                required_by: Some(manager),
            } => write!(f, "install component {} (required by {})", component.name(), manager),
            PlanStep::InstallComponent { component, .. } => {
                write!(f, "install component {}", component.name())
            }
        }
    }
}

impl fmt::Debug for PlanStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PlanStep({})", self)
    }
}

/// Ordered steps deploying one environment.
#[derive(Debug, Clone, Default)]
pub struct DeploymentPlan {
    pub environment: String,
    pub steps: Vec<PlanStep>,
    /// Components left out because they have no install command.
    pub skipped: Vec<String>,
}

impl DeploymentPlan {
    /// Components installed by this plan, in order.
    pub fn components(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PlanStep::InstallComponent { component, .. } => Some(component.name()),
                _ => None,
            })
            .collect()
    }

    /// Names of the managers used by this plan, in order.
    pub fn managers(&self) -> Vec<&str> {
        self.steps
            .iter()
            .filter_map(|step| match step {
                PlanStep::InstallPackages { manager, .. } => Some(manager.name()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

/// Plan the deployment of `environment`.
///
/// `image` selects additional image-specific package groups. `runner` is
/// only used to probe for the system package manager.
///
/// # Errors
///
/// Returns `DependencyResolution` when a manager dependency does not match
/// exactly one remaining component, `Validation` when that component cannot
/// be installed, and `PackageManagerUnavailable` when a manager cannot be
/// resolved.
pub fn plan(
    environment: &SoftwareEnvironment,
    image: Option<&str>,
    managers: &PackageManagers,
    runner: &mut dyn CommandRunner,
) -> Result<DeploymentPlan> {
    let mut plan = DeploymentPlan {
        environment: environment.name.clone(),
        ..Default::default()
    };

    for var in &environment.platform.env {
        plan.steps.push(PlanStep::SetEnv {
            name: var.name.clone(),
            value: var.value.clone(),
        });
    }

    let mut remaining = environment.collect_components();
    let mut consumed: Vec<String> = Vec::new();

    for group in merge_package_groups(&environment.package_groups(image)) {
        for dependency in &group.dependencies {
            if consumed.contains(dependency) {
                trace!("'{}' is already installed for another manager", dependency);
                continue;
            }
            let matches = remaining
                .iter()
                .filter(|c| c.name() == dependency.as_str())
                .count();
            if matches != 1 {
                return Err(StackwrightError::DependencyResolution {
                    manager: group.manager.clone(),
                    dependency: dependency.clone(),
                    matches,
                });
            }

            let Some(index) = remaining.iter().position(|c| c.name() == dependency.as_str())
            else {
                continue;
            };
            if remaining[index].command(CommandType::Install).is_none() {
                return Err(StackwrightError::Validation {
                    message: format!(
                        "Component '{}' is required by package manager '{}' but has no install command",
                        dependency, group.manager
                    ),
                });
            }
            let component = remaining.remove(index);
            debug!("Installing '{}' before '{}' packages", dependency, group.manager);
            consumed.push(dependency.clone());
            plan.steps.push(PlanStep::InstallComponent {
                component,
                required_by: Some(group.manager.clone()),
            });
        }

        let manager = managers.resolve(&group.manager, group.install_command.as_deref(), runner)?;
        if group.packages.is_empty() {
            continue;
        }
        plan.steps.push(PlanStep::InstallPackages {
            manager,
            packages: group.packages,
        });
    }

    for component in remaining {
        if component.command(CommandType::Install).is_none() {
            warn!(
                "Skipping '{}', it has no install command",
                component.name()
            );
            plan.skipped.push(component.name().to_string());
            continue;
        }
        plan.steps.push(PlanStep::InstallComponent {
            component,
            required_by: None,
        });
    }

    debug!(
        "Planned {} steps for environment '{}'",
        plan.steps.len(),
        plan.environment
    );
    Ok(plan)
}
