//! Resolved software environments.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, error};

use super::manifest::{EnvVar, Manifest, Packages};
use crate::component::SoftwareComponent;
use crate::error::{Result, StackwrightError};
use crate::platform::{HostProbe, OperatingSystem, PlatformIssue, PlatformSupportChecker};
use crate::registry::Registry;
use crate::validation::{environment_shape, validate_file};

/// A requested component and what it resolved to.
#[derive(Debug, Clone)]
pub struct Component {
    pub name: String,
    pub purpose: Option<String>,
    pub version: String,
    /// The registered component, or `None` if no component has this name.
    pub software_component: Option<Arc<SoftwareComponent>>,
}

/// A container image with its own package groups.
#[derive(Debug, Clone)]
pub struct Image {
    pub id: String,
    pub packages: Vec<Packages>,
}

#[derive(Debug, Clone, Default)]
pub struct Platform {
    /// Supported operating systems. Empty means any.
    pub os: Vec<OperatingSystem>,
    pub env: Vec<EnvVar>,
    /// Package groups installed on every target.
    pub packages: Vec<Packages>,
    pub images: Vec<Image>,
}

/// An environment manifest with its components resolved.
#[derive(Debug, Clone)]
pub struct SoftwareEnvironment {
    pub path: PathBuf,
    pub name: String,
    pub description: Option<String>,
    pub platform: Platform,
    pub components: Vec<Component>,
}

impl SoftwareEnvironment {
    /// Load, validate and resolve the manifest at `path`.
    ///
    /// # Errors
    ///
    /// Returns `SchemaValidation` listing every violated rule, or
    /// `Validation` if the file cannot be read or names an unknown
    /// operating system.
    pub fn from_file(path: &Path, registry: &Registry) -> Result<Self> {
        let document = validate_file(&environment_shape(), path)?;
        let manifest: Manifest =
            serde_yaml::from_value(document).map_err(|e| StackwrightError::ConfigParse {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
        Self::from_manifest(path, manifest, registry)
    }

    /// Resolve an already parsed manifest against `registry`.
    pub fn from_manifest(path: &Path, manifest: Manifest, registry: &Registry) -> Result<Self> {
        let spec = manifest.environment;

        let os = match &spec.platform.os {
            Some(os) => os
                .names()
                .into_iter()
                .map(|name| {
                    name.parse::<OperatingSystem>()
                        .map_err(|message| StackwrightError::Validation {
                            message: format!("{} in '{}'", message, path.display()),
                        })
                })
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        let images = spec
            .platform
            .images
            .into_iter()
            .map(|image| Image {
                id: image.id,
                packages: image.packages.into_groups(),
            })
            .collect();

        let components = spec
            .components
            .into_iter()
            .map(|component| Component {
                software_component: registry.find_component(&component.name),
                name: component.name,
                purpose: component.purpose,
                version: component.version,
            })
            .collect();

        let environment = Self {
            path: path.to_path_buf(),
            name: spec.name,
            description: spec.description,
            platform: Platform {
                os,
                env: spec.platform.env,
                packages: spec.platform.packages.into_groups(),
                images,
            },
            components,
        };
        debug!(
            "Loaded environment '{}' with {} components from '{}'",
            environment.name,
            environment.components.len(),
            path.display()
        );
        Ok(environment)
    }

    /// Registered components of this environment, in manifest order.
    ///
    /// Unknown components are logged and left out.
    pub fn collect_components(&self) -> Vec<Arc<SoftwareComponent>> {
        let unknown = self.unknown_components();
        if !unknown.is_empty() {
            error!(
                "{} of the {} requested components are unknown, specifically: {}",
                unknown.len(),
                self.components.len(),
                unknown.join(", ")
            );
        }
        self.components
            .iter()
            .filter_map(|c| c.software_component.clone())
            .collect()
    }

    /// Names of requested components that are not registered.
    pub fn unknown_components(&self) -> Vec<&str> {
        self.components
            .iter()
            .filter(|c| c.software_component.is_none())
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Fail with `UnknownComponent` if any requested component is missing.
    pub fn check_components(&self) -> Result<()> {
        let unknown = self.unknown_components();
        if unknown.is_empty() {
            return Ok(());
        }
        Err(StackwrightError::UnknownComponent {
            names: unknown.into_iter().map(str::to_string).collect(),
            total: self.components.len(),
        })
    }

    /// Issues preventing this environment from being deployed on `host`.
    pub fn check_platform(&self, host: &dyn HostProbe) -> Vec<PlatformIssue> {
        if self.platform.os.is_empty() {
            return Vec::new();
        }
        PlatformSupportChecker::new(host)
            .check_operating_system(&self.platform.os)
            .into_issues()
    }

    pub fn image(&self, id: &str) -> Option<&Image> {
        self.platform.images.iter().find(|image| image.id == id)
    }

    /// Package groups to install: common groups, then those of `image`.
    pub fn package_groups(&self, image: Option<&str>) -> Vec<Packages> {
        let mut groups = self.platform.packages.clone();
        if let Some(image) = image.and_then(|id| self.image(id)) {
            groups.extend(image.packages.iter().cloned());
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::component::{Action, Command, CommandContext, CommandType};
    use crate::platform::StaticHost;
    use tempfile::TempDir;

    struct Noop;

    impl Action for Noop {
        fn execute(&self, _ctx: &mut CommandContext<'_>) -> Result<()> {
            Ok(())
        }
    }

    fn registry(names: &[&str]) -> Registry {
        let mut registry = Registry::new(Arc::new(StaticHost::new(OperatingSystem::Linux)));
        for name in names {
            let mut component = SoftwareComponent::new(*name);
            component.add_command(Command::new(CommandType::Install, *name, Noop), false);
            registry.register_component(component);
        }
        registry
    }

    fn write_manifest(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("env.yml");
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn resolves_components_eagerly() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(
            &temp,
            r#"
environment:
  name: dev
  description: Developer workstation
  components:
    - name: git
      purpose: Source control
    - name: dive
      version: "0.12"
"#,
        );

        let environment = SoftwareEnvironment::from_file(&path, &registry(&["git"])).unwrap();
        assert_eq!(environment.name, "dev");
        assert_eq!(environment.components.len(), 2);
        assert!(environment.components[0].software_component.is_some());
        assert!(environment.components[1].software_component.is_none());
        assert_eq!(environment.components[1].version, "0.12");
    }

    #[test]
    fn collect_components_reports_unknown() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(
            &temp,
            "environment:\n  name: dev\n  components:\n    - name: git\n    - name: dive\n",
        );

        let environment = SoftwareEnvironment::from_file(&path, &registry(&["git"])).unwrap();
        let collected = environment.collect_components();
        assert_eq!(collected.len(), 1);
        assert_eq!(collected[0].name(), "git");

        let err = environment.check_components().unwrap_err();
        assert_eq!(
            err.to_string(),
            "1 of the 2 requested components are unknown, specifically: dive"
        );
    }

    #[test]
    fn schema_violations_are_all_reported() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(
            &temp,
            "environment:\n  description: 3\n  components:\n    - purpose: none\n",
        );

        match SoftwareEnvironment::from_file(&path, &registry(&[])) {
            Err(StackwrightError::SchemaValidation { violations, .. }) => {
                assert!(violations.len() >= 2);
            }
            other => panic!("expected schema violations, got {:?}", other.map(|e| e.name)),
        }
    }

    #[test]
    fn unknown_operating_system_is_rejected() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(
            &temp,
            "environment:\n  name: dev\n  platform:\n    os: beos\n  components: []\n",
        );

        assert!(matches!(
            SoftwareEnvironment::from_file(&path, &registry(&[])),
            Err(StackwrightError::Validation { .. })
        ));
    }

    #[test]
    fn platform_check_and_image_packages() {
        let temp = TempDir::new().unwrap();
        let path = write_manifest(
            &temp,
            r#"
environment:
  name: dev
  platform:
    os: [windows]
    packages: [git]
    images:
      - id: ubuntu:24.04
        packages:
          - packages: [curl]
            manager: apt
  components: []
"#,
        );

        let environment = SoftwareEnvironment::from_file(&path, &registry(&[])).unwrap();
        let host = StaticHost::new(OperatingSystem::Linux);
        assert_eq!(environment.check_platform(&host).len(), 1);

        assert_eq!(environment.package_groups(None).len(), 1);
        let groups = environment.package_groups(Some("ubuntu:24.04"));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[1].manager, "apt");
        assert_eq!(environment.package_groups(Some("alpine")).len(), 1);
    }
}
