//! Deploy command implementation.
//!
//! The `stackwright env deploy` command plans an environment and runs the
//! plan on this machine or inside a working container.

use crate::cli::args::DeployArgs;
use crate::config::Configuration;
use crate::container::Buildah;
use crate::environment::{
    ContainerTarget, DeploymentPlan, DeploymentTarget, LocalTarget, SoftwareEnvironment,
};
use crate::error::Result;
use crate::packages::PackageManagers;
use crate::registry;
use crate::runner::LocalCommandRunner;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::env::resolve_environment;

pub struct DeployCommand<'a> {
    config: &'a Configuration,
    args: DeployArgs,
}

impl<'a> DeployCommand<'a> {
    pub fn new(config: &'a Configuration, args: DeployArgs) -> Self {
        Self { config, args }
    }

    fn run_target(
        &self,
        environment: &SoftwareEnvironment,
        managers: &PackageManagers,
    ) -> Result<DeploymentPlan> {
        if self.args.container {
            let engine = Buildah::new();
            let binary = std::env::current_exe()?;
            let mut target = ContainerTarget::new(&engine, binary).dry_run(self.args.dry_run);
            if let Some(image) = &self.args.image {
                target = target.with_image(image);
            }
            if let Some(name) = &self.args.name {
                target = target.with_container_name(name);
            }
            if let Some(commit) = &self.args.commit {
                target = target.commit_as(commit);
            }
            target.deploy(environment, managers)
        } else {
            let registry = registry::global();
            let mut runner = LocalCommandRunner::new();
            LocalTarget::new(registry.host(), &mut runner)
                .dry_run(self.args.dry_run)
                .deploy(environment, managers)
        }
    }
}

/// Print the steps of `plan` and the components it leaves out.
pub(crate) fn report_plan(plan: &DeploymentPlan, ui: &mut dyn UserInterface) {
    if plan.is_empty() {
        ui.message(&format!("Nothing to deploy for '{}'", plan.environment));
    }
    for (index, step) in plan.steps.iter().enumerate() {
        ui.message(&format!("{:>3}. {}", index + 1, step));
    }
    for name in &plan.skipped {
        ui.warning(&format!("'{}' has no install command and was skipped", name));
    }
}

impl Command for DeployCommand<'_> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let environment = {
            let registry = registry::global();
            resolve_environment(self.config, &registry, &self.args.environment)?
        };

        if self.args.skip_unknown {
            let unknown = environment.unknown_components();
            if !unknown.is_empty() {
                ui.warning(&format!("Skipping unknown components: {}", unknown.join(", ")));
            }
        } else {
            environment.check_components()?;
        }

        let managers = PackageManagers::builtin();
        let action = if self.args.dry_run { "Planning" } else { "Deploying" };
        let mut spinner = ui.start_spinner(&format!("{} '{}'...", action, environment.name));

        match self.run_target(&environment, &managers) {
            Ok(plan) => {
                if self.args.dry_run {
                    spinner.finish_success(&format!(
                        "Planned '{}' ({} steps)",
                        environment.name,
                        plan.steps.len()
                    ));
                    report_plan(&plan, ui);
                } else {
                    spinner.finish_success(&format!("Deployed '{}'", environment.name));
                    for name in &plan.skipped {
                        ui.warning(&format!("'{}' has no install command and was skipped", name));
                    }
                }
                Ok(CommandResult::success())
            }
            Err(e) => {
                spinner.finish_error(&format!("Deploying '{}' failed", environment.name));
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::NativeCatalog;
    use crate::environment::plan;
    use crate::platform::{OperatingSystem, StaticHost};
    use crate::registry::Registry;
    use crate::runner::RecordingRunner;
    use crate::ui::MockUI;
    use std::fs;
    use std::sync::Arc;
    use tempfile::TempDir;

    #[test]
    fn report_lists_steps_in_order() {
        let temp = TempDir::new().unwrap();
        let manifest = temp.path().join("dev.yml");
        fs::write(
            &manifest,
            "\
environment:
  name: dev
  platform:
    env:
      - name: EDITOR
        value: vim
  components:
    - name: git
",
        )
        .unwrap();

        let mut registry = Registry::new(Arc::new(StaticHost::new(OperatingSystem::Linux)));
        let git = NativeCatalog::builtin()
            .find("git")
            .unwrap()
            .build("git")
            .unwrap();
        registry.register_component(git);
        let environment = SoftwareEnvironment::from_file(&manifest, &registry).unwrap();

        let mut runner = RecordingRunner::new();
        let plan = plan(&environment, None, &PackageManagers::builtin(), &mut runner).unwrap();

        let mut ui = MockUI::new();
        report_plan(&plan, &mut ui);

        assert_eq!(ui.messages().len(), 2);
        assert!(ui.messages()[0].contains("EDITOR"));
        assert!(ui.messages()[1].contains("install component git"));
    }
}
