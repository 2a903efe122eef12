//! Serde model of environment manifest files.
//!
//! These types mirror the YAML layout one-to-one. Documents are checked
//! against [`environment_shape`](crate::validation::environment_shape) before
//! they are deserialized here, so deserialization only fails on values the
//! structural schema cannot express.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::packages::SYSTEM_MANAGER;

/// Root of an environment manifest.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    pub environment: EnvironmentSpec,
}

/// The `environment` section.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EnvironmentSpec {
    /// Unique environment name.
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub platform: PlatformSpec,

    /// Components to install, in installation order.
    pub components: Vec<ComponentSpec>,
}

/// Platform requirements and OS-level packages.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(default, deny_unknown_fields)]
pub struct PlatformSpec {
    /// Supported operating systems; any when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<OsSpec>,

    /// Environment variables set before anything is installed.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub env: Vec<EnvVar>,

    /// Packages installed on every target.
    pub packages: PackageList,

    /// Container images this environment can be deployed into.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub images: Vec<ImageSpec>,
}

/// `os: linux` or `os: [linux, macos]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OsSpec {
    One(String),
    Many(Vec<String>),
}

impl OsSpec {
    pub fn names(&self) -> Vec<&str> {
        match self {
            OsSpec::One(name) => vec![name.as_str()],
            OsSpec::Many(names) => names.iter().map(String::as_str).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct EnvVar {
    pub name: String,
    pub value: String,
}

/// Either plain package names for the system manager or explicit groups.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum PackageList {
    Names(Vec<String>),
    Groups(Vec<Packages>),
}

impl Default for PackageList {
    fn default() -> Self {
        PackageList::Names(Vec::new())
    }
}

impl PackageList {
    /// Normalize to manager groups. Plain names become one `system` group.
    pub fn into_groups(self) -> Vec<Packages> {
        match self {
            PackageList::Names(names) if names.is_empty() => Vec::new(),
            PackageList::Names(names) => vec![Packages::system(names)],
            PackageList::Groups(groups) => groups,
        }
    }
}

/// Packages installed together by one manager.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct Packages {
    pub packages: Vec<String>,

    /// Manager name; `system` probes the target for its package manager.
    #[serde(default = "default_manager")]
    pub manager: String,

    /// Component that must be installed before the manager is usable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dependency: Option<String>,

    /// Install command for managers without a built-in implementation.
    /// The package names are appended to it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub install_command: Option<String>,
}

impl Packages {
    pub fn system(packages: Vec<String>) -> Self {
        Self {
            packages,
            manager: default_manager(),
            dependency: None,
            install_command: None,
        }
    }
}

fn default_manager() -> String {
    SYSTEM_MANAGER.to_string()
}

/// A container image and the packages it additionally needs.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ImageSpec {
    pub id: String,

    #[serde(default)]
    pub packages: PackageList,
}

/// A requested component.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ComponentSpec {
    pub name: String,

    /// Why the environment needs this component.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,

    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    "latest".to_string()
}

/// JSON Schema of the manifest format, pretty-printed.
pub fn manifest_schema() -> Result<String> {
    let schema = schemars::schema_for!(Manifest);
    let json = serde_json::to_string_pretty(&schema).map_err(anyhow::Error::from)?;
    Ok(json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_applied() {
        let manifest: Manifest = serde_yaml::from_str(
            r#"
environment:
  name: basic
  components:
    - name: git
"#,
        )
        .unwrap();

        let environment = manifest.environment;
        assert_eq!(environment.components[0].version, "latest");
        assert!(environment.platform.os.is_none());
        assert!(environment.platform.packages.into_groups().is_empty());
    }

    #[test]
    fn plain_package_names_form_a_system_group() {
        let list: PackageList = serde_yaml::from_str("[git, curl]").unwrap();
        assert_eq!(
            list.into_groups(),
            vec![Packages::system(vec!["git".to_string(), "curl".to_string()])]
        );
    }

    #[test]
    fn package_groups_keep_manager_and_dependency() {
        let list: PackageList = serde_yaml::from_str(
            r#"
- packages: [java]
  manager: sdk
  dependency: sdkman
"#,
        )
        .unwrap();

        let groups = list.into_groups();
        assert_eq!(groups[0].manager, "sdk");
        assert_eq!(groups[0].dependency.as_deref(), Some("sdkman"));
        assert!(groups[0].install_command.is_none());
    }

    #[test]
    fn os_accepts_string_or_list() {
        let one: OsSpec = serde_yaml::from_str("linux").unwrap();
        let many: OsSpec = serde_yaml::from_str("[linux, macos]").unwrap();
        assert_eq!(one.names(), ["linux"]);
        assert_eq!(many.names(), ["linux", "macos"]);
    }

    #[test]
    fn schema_describes_environment() {
        let schema = manifest_schema().unwrap();
        assert!(schema.contains("\"environment\""));
        assert!(schema.contains("install_command"));
    }
}
