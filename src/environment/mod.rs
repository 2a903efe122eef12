//! Software environments.
//!
//! An environment manifest names the components a machine or image needs,
//! plus OS-level packages grouped by package manager. Manifests are loaded
//! into [`SoftwareEnvironment`] values, turned into a [`DeploymentPlan`] and
//! executed by a [`DeploymentTarget`].

pub mod catalog;
pub mod deploy;
pub mod manifest;
pub mod plan;
pub mod software;

pub use catalog::{EnvironmentCatalog, EnvironmentScanner};
pub use deploy::{ContainerTarget, DeploymentTarget, LocalTarget, REMOTE_BINARY, REMOTE_COMPONENTS};
pub use manifest::{manifest_schema, Manifest, PackageList, Packages};
pub use plan::{merge_package_groups, plan, DeploymentPlan, ManagerGroup, PlanStep};
pub use software::{Component, Image, Platform, SoftwareEnvironment};
