//! Stackwright - discover software components and deploy software environments.
//!
//! Stackwright scans component folders for declarative command descriptors,
//! combines them with compiled-in plugins into a registry of software
//! components, and deploys environment manifests onto this machine or into
//! container images.
//!
//! # Modules
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`component`] - Software components, their commands and native plugins
//! - [`config`] - Configuration file discovery and layering
//! - [`container`] - Working-container engines
//! - [`environment`] - Environment manifests, deployment plans and targets
//! - [`error`] - Error types and result aliases
//! - [`packages`] - OS-level package managers
//! - [`platform`] - Host probing and platform support checks
//! - [`provider`] - Providers turning descriptors into command actions
//! - [`registry`] - Component and command registries
//! - [`runner`] - Shell command execution
//! - [`scanner`] - Component folder scanning
//! - [`ui`] - Spinners, tables and terminal output
//! - [`validation`] - Structural validation of YAML documents
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use stackwright::platform::{OperatingSystem, StaticHost};
//! use stackwright::registry::Registry;
//! use stackwright::component::NativeCatalog;
//!
//! let mut registry = Registry::new(Arc::new(StaticHost::new(OperatingSystem::Linux)));
//! let choco = NativeCatalog::builtin().find("chocolatey").unwrap().build("chocolatey").unwrap();
//! registry.register_component(choco);
//!
//! let install = registry.find_command(&["install", "chocolatey"]).unwrap();
//! // Chocolatey only runs on Windows, so this host gets a stub.
//! assert!(!install.is_supported());
//! ```
//!
//! For scanning folders and deploying environments, see the integration tests.

pub mod cli;
pub mod component;
pub mod config;
pub mod container;
pub mod environment;
pub mod error;
pub mod glob;
pub mod packages;
pub mod platform;
pub mod provider;
pub mod registry;
pub mod runner;
pub mod scanner;
pub mod ui;
pub mod validation;

pub use error::{Result, StackwrightError};
