//! Deployment targets.
//!
//! Both targets plan first and execute second. They differ in where the
//! plan's commands run and in how components get installed there:
//! [`LocalTarget`] invokes the registered install commands in-process,
//! [`ContainerTarget`] copies the `stackwright` binary and each component's
//! files into a working container and installs remotely.

use std::path::PathBuf;

use tracing::{debug, info, warn};

use super::plan::{plan, DeploymentPlan, PlanStep};
use super::software::SoftwareEnvironment;
use crate::component::{BuiltCommand, CommandType, SoftwareComponent};
use crate::container::{ContainerCommandRunner, ContainerEngine};
use crate::error::{Result, StackwrightError};
use crate::packages::PackageManagers;
use crate::platform::HostProbe;
use crate::runner::CommandRunner;

/// Where the `stackwright` binary is installed inside containers.
pub const REMOTE_BINARY: &str = "/usr/local/bin/stackwright";

/// Component search root used inside containers.
pub const REMOTE_COMPONENTS: &str = "/tmp/stackwright/components";

/// Somewhere an environment can be deployed.
pub trait DeploymentTarget {
    /// Plan and, unless this is a dry run, execute the deployment.
    fn deploy(
        &mut self,
        environment: &SoftwareEnvironment,
        managers: &PackageManagers,
    ) -> Result<DeploymentPlan>;
}

/// Deploys onto the machine running this process.
///
/// Every planned install command is built for the host before the first
/// step runs, so an unsupported component fails the whole deployment.
pub struct LocalTarget<'a> {
    host: &'a dyn HostProbe,
    runner: &'a mut dyn CommandRunner,
    dry_run: bool,
}

impl<'a> LocalTarget<'a> {
    pub fn new(host: &'a dyn HostProbe, runner: &'a mut dyn CommandRunner) -> Self {
        Self {
            host,
            runner,
            dry_run: false,
        }
    }

    /// Only plan, never execute.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Builds the install command of every planned component, failing on the
    /// first one that cannot run on this host.
    fn build_installs(&self, plan: &DeploymentPlan) -> Result<Vec<BuiltCommand>> {
        let mut installs = Vec::new();
        for step in &plan.steps {
            let PlanStep::InstallComponent { component, .. } = step else {
                continue;
            };
            let built = component
                .build_command(CommandType::Install, self.host, None)
                .ok_or_else(|| StackwrightError::Validation {
                    message: format!("Component '{}' has no install command", component.name()),
                })?;
            if !built.is_supported() {
                return Err(StackwrightError::UnsupportedPlatform {
                    component: component.name().to_string(),
                    command: CommandType::Install.to_string(),
                    issues: built.issues().to_vec(),
                });
            }
            installs.push(built);
        }
        Ok(installs)
    }
}

impl DeploymentTarget for LocalTarget<'_> {
    fn deploy(
        &mut self,
        environment: &SoftwareEnvironment,
        managers: &PackageManagers,
    ) -> Result<DeploymentPlan> {
        let issues = environment.check_platform(self.host);
        if !issues.is_empty() {
            return Err(StackwrightError::UnsupportedPlatform {
                component: environment.name.clone(),
                command: "deploy".to_string(),
                issues,
            });
        }

        let plan = plan(environment, None, managers, self.runner)?;
        let mut installs = self.build_installs(&plan)?.into_iter();
        if self.dry_run {
            return Ok(plan);
        }

        info!("Deploying environment '{}' on {}", plan.environment, self.runner.target());
        for step in &plan.steps {
            debug!("Step: {}", step);
            match step {
                PlanStep::SetEnv { name, value } => self.runner.set_env(name, value),
                PlanStep::InstallPackages { manager, packages } => {
                    manager.install(packages, self.runner)?
                }
                PlanStep::InstallComponent { .. } => {
                    if let Some(install) = installs.next() {
                        install.invoke(self.runner)?;
                    }
                }
            }
        }
        Ok(plan)
    }
}

/// Deploys into an ephemeral working container.
pub struct ContainerTarget<'e> {
    engine: &'e dyn ContainerEngine,
    binary: PathBuf,
    image: Option<String>,
    container_name: Option<String>,
    commit: Option<String>,
    dry_run: bool,
}

impl<'e> ContainerTarget<'e> {
    /// `binary` is the `stackwright` executable copied into the container.
    pub fn new(engine: &'e dyn ContainerEngine, binary: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            binary: binary.into(),
            image: None,
            container_name: None,
            commit: None,
            dry_run: false,
        }
    }

    /// Base image; defaults to the environment's only image.
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_container_name(mut self, name: impl Into<String>) -> Self {
        self.container_name = Some(name.into());
        self
    }

    /// Commit the container to `image_name` after a successful deployment.
    pub fn commit_as(mut self, image_name: impl Into<String>) -> Self {
        self.commit = Some(image_name.into());
        self
    }

    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    fn select_image(&self, environment: &SoftwareEnvironment) -> Result<String> {
        if let Some(image) = &self.image {
            return Ok(image.clone());
        }
        match environment.platform.images.as_slice() {
            [image] => Ok(image.id.clone()),
            images => Err(StackwrightError::Validation {
                message: format!(
                    "Environment '{}' declares {} images, pick one with --image",
                    environment.name,
                    images.len()
                ),
            }),
        }
    }

    fn deploy_in(
        &self,
        container: &str,
        image: &str,
        environment: &SoftwareEnvironment,
        managers: &PackageManagers,
    ) -> Result<DeploymentPlan> {
        let mut runner = ContainerCommandRunner::new(self.engine, container);
        let plan = plan(environment, Some(image), managers, &mut runner)?;
        if self.dry_run {
            return Ok(plan);
        }

        debug!("Copying '{}' into {}", self.binary.display(), runner.target());
        self.engine
            .copy(container, &self.binary, REMOTE_BINARY, None)?;

        for step in &plan.steps {
            debug!("Step: {}", step);
            match step {
                PlanStep::SetEnv { name, value } => runner.set_env(name, value),
                PlanStep::InstallPackages { manager, packages } => {
                    manager.install(packages, &mut runner)?;
                    manager.clean(&mut runner)?;
                }
                PlanStep::InstallComponent { component, .. } => {
                    self.install_component(container, component, &mut runner)?
                }
            }
        }

        if let Some(image_name) = &self.commit {
            let id = self.engine.commit(container, Some(image_name))?;
            info!("Committed '{}' as image '{}' ({})", container, image_name, id);
        }
        Ok(plan)
    }

    fn install_component(
        &self,
        container: &str,
        component: &SoftwareComponent,
        runner: &mut ContainerCommandRunner<'_>,
    ) -> Result<()> {
        let destination = format!("{}/{}", REMOTE_COMPONENTS, component.name());
        for folder in component.folders() {
            self.engine.copy(container, folder, &destination, None)?;
        }
        runner.run(&format!(
            "{} --component-path {} install {}",
            REMOTE_BINARY,
            REMOTE_COMPONENTS,
            component.name()
        ))?;
        runner.run(&format!("rm -rf {}", destination))?;
        Ok(())
    }
}

impl DeploymentTarget for ContainerTarget<'_> {
    fn deploy(
        &mut self,
        environment: &SoftwareEnvironment,
        managers: &PackageManagers,
    ) -> Result<DeploymentPlan> {
        let image = self.select_image(environment)?;
        let container = self
            .engine
            .create(&image, self.container_name.as_deref())?;
        info!("Deploying environment '{}' into container '{}' from '{}'", environment.name, container, image);

        let result = self.deploy_in(&container, &image, environment, managers);

        match (self.engine.remove(&container), result) {
            (Ok(()), result) => result,
            (Err(e), Ok(_)) => Err(e),
            (Err(e), Err(original)) => {
                warn!("Failed to remove container '{}': {}", container, e);
                Err(original)
            }
        }
    }
}
