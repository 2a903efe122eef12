//! Component discovery.
//!
//! The scanner walks component search roots and merges everything found for
//! a component name, across all roots, into one [`SoftwareComponent`]:
//!
//! - every native plugin of the [`NativeCatalog`] is seeded first
//! - each subfolder of a valid root contributes its folder and files
//! - `component: {plugin: ...}` descriptors bind a folder to a native plugin
//! - `command: {type, provider, configuration}` descriptors are queued and
//!   attached once every root has been scanned
//!
//! Nothing found during a scan is fatal. Problems are logged and returned as
//! diagnostics in the [`ScanReport`].

pub mod report;
pub mod result;

pub use report::{DiagnosticKind, ScanDiagnostic, ScanReport};
pub use result::{CommandResult, ComponentResult};

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, trace, warn};

use crate::component::{Command, CommandType, NativeCatalog, SoftwareComponent};
use crate::provider::ProviderRegistry;
use crate::registry::Registry;
use crate::validation::{command_descriptor_shape, plugin_descriptor_shape, validate_value};

/// File marking a directory not named `components` as a component root.
pub const COMPONENT_ROOT_MARKER: &str = ".stackwright-components";

/// Folders starting with this prefix are never components.
pub const IGNORE_PREFIX: &str = "__";

/// Discovers components and registers them.
pub struct ComponentScanner<'a> {
    catalog: &'a NativeCatalog,
    providers: &'a ProviderRegistry,
}

impl<'a> ComponentScanner<'a> {
    pub fn new(catalog: &'a NativeCatalog, providers: &'a ProviderRegistry) -> Self {
        Self { catalog, providers }
    }

    /// Scan `search_paths` in order and register every valid component.
    pub fn scan(&self, search_paths: &[PathBuf], registry: &mut Registry) -> ScanReport {
        let mut report = ScanReport::default();
        let mut results: BTreeMap<String, ComponentResult> = BTreeMap::new();

        trace!("Looking for software components in {} places", search_paths.len());

        self.seed_native(&mut results, &mut report);
        for search_path in search_paths {
            if is_valid_search_path(search_path) {
                self.scan_search_path(search_path, &mut results, &mut report);
            }
        }

        for (name, result) in results {
            if let Some(component) = self.assemble(&name, result, &mut report) {
                registry.register_component(component);
                report.components.push(name);
            }
        }

        debug!(
            "Registered {} components with {} diagnostics",
            report.components.len(),
            report.diagnostics.len()
        );
        report
    }

    fn seed_native(&self, results: &mut BTreeMap<String, ComponentResult>, report: &mut ScanReport) {
        for plugin in self.catalog.plugins() {
            match plugin.build(plugin.id()) {
                Ok(component) => {
                    trace!("Found native software component '{}'", plugin.id());
                    results.entry(plugin.id().to_string()).or_default().component = Some(component);
                }
                Err(e) => {
                    warn!("Failed to instantiate software component '{}': {}", plugin.id(), e);
                    report.diagnose(
                        DiagnosticKind::FailedPlugin,
                        Some(plugin.id()),
                        None,
                        e.to_string(),
                    );
                }
            }
        }
    }

    fn scan_search_path(
        &self,
        search_path: &Path,
        results: &mut BTreeMap<String, ComponentResult>,
        report: &mut ScanReport,
    ) {
        trace!("Looking for software components in '{}'", search_path.display());

        let folders = match sorted_entries(search_path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Unable to read '{}': {}", search_path.display(), e);
                report.diagnose(
                    DiagnosticKind::InvalidDescriptor,
                    None,
                    Some(search_path.to_path_buf()),
                    format!("Unable to read search path: {}", e),
                );
                return;
            }
        };

        for folder in folders.into_iter().filter(|p| contains_software_component(p)) {
            let Some(name) = folder.file_name().map(|n| n.to_string_lossy().to_string()) else {
                continue;
            };
            trace!("Found folder for software component '{}'", name);
            let result = results.entry(name.clone()).or_default();
            self.scan_folder(&name, &folder, result, report);
        }
    }

    fn scan_folder(
        &self,
        name: &str,
        folder: &Path,
        result: &mut ComponentResult,
        report: &mut ScanReport,
    ) {
        result.folders.push(folder.to_path_buf());

        let mut files = Vec::new();
        collect_files(folder, &mut files);
        for file in &files {
            result.files.push(file.clone());
        }

        // Only top-level YAML files can define commands or bind plugins.
        for file in files.iter().filter(|f| f.parent() == Some(folder) && is_yaml(f)) {
            self.scan_descriptor(name, file, result, report);
        }
    }

    fn scan_descriptor(
        &self,
        name: &str,
        file: &Path,
        result: &mut ComponentResult,
        report: &mut ScanReport,
    ) {
        let document = match fs::read_to_string(file)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_yaml::from_str::<Value>(&content).map_err(|e| e.to_string()))
        {
            Ok(document) => document,
            Err(e) => {
                warn!("Skipping unreadable descriptor '{}': {}", file.display(), e);
                report.diagnose(
                    DiagnosticKind::InvalidDescriptor,
                    Some(name),
                    Some(file.to_path_buf()),
                    e,
                );
                return;
            }
        };

        if document.get("command").is_some() {
            self.queue_command(name, file, &document, result, report);
        } else if document.get("component").is_some() {
            self.bind_plugin(name, file, &document, result, report);
        } else {
            trace!("'{}' is not a descriptor, keeping it as a component file", file.display());
        }
    }

    fn queue_command(
        &self,
        name: &str,
        file: &Path,
        document: &Value,
        result: &mut ComponentResult,
        report: &mut ScanReport,
    ) {
        let violations = validate_value(&command_descriptor_shape(), document);
        if !violations.is_empty() {
            let message = violations
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("; ");
            warn!("Invalid command descriptor '{}': {}", file.display(), message);
            report.diagnose(
                DiagnosticKind::InvalidDescriptor,
                Some(name),
                Some(file.to_path_buf()),
                message,
            );
            return;
        }

        let command = &document["command"];
        let (Some(provider), Some(Ok(command_type))) = (
            command["provider"].as_str(),
            command["type"].as_str().map(str::parse::<CommandType>),
        ) else {
            return;
        };

        trace!(
            "Queueing '{}' command of '{}' from provider '{}'",
            command_type,
            name,
            provider
        );
        result.commands.push(CommandResult {
            source: file.to_path_buf(),
            provider: provider.to_string(),
            command_type,
            configuration: command
                .get("configuration")
                .cloned()
                .unwrap_or(Value::Null),
        });
    }

    fn bind_plugin(
        &self,
        name: &str,
        file: &Path,
        document: &Value,
        result: &mut ComponentResult,
        report: &mut ScanReport,
    ) {
        let violations = validate_value(&plugin_descriptor_shape(), document);
        if let Some(violation) = violations.first() {
            warn!("Invalid component descriptor '{}': {}", file.display(), violation);
            report.diagnose(
                DiagnosticKind::InvalidDescriptor,
                Some(name),
                Some(file.to_path_buf()),
                violation.to_string(),
            );
            return;
        }

        let plugin_id = document["component"]["plugin"].as_str().unwrap_or_default();
        let Some(plugin) = self.catalog.find(plugin_id) else {
            warn!("Unknown component plugin '{}' in '{}'", plugin_id, file.display());
            report.diagnose(
                DiagnosticKind::DroppedDescriptor,
                Some(name),
                Some(file.to_path_buf()),
                format!("Unknown component plugin '{}'", plugin_id),
            );
            return;
        };

        if result.component.is_some() {
            trace!("'{}' already has a native definition, ignoring '{}'", name, file.display());
            return;
        }

        match plugin.build(name) {
            Ok(mut component) => {
                if let Some(description) = document["component"]["description"].as_str() {
                    component.set_description(description);
                }
                trace!("Bound '{}' to native plugin '{}'", name, plugin_id);
                result.component = Some(component);
            }
            Err(e) => {
                warn!("Failed to instantiate software component '{}': {}", name, e);
                report.diagnose(
                    DiagnosticKind::FailedPlugin,
                    Some(name),
                    Some(file.to_path_buf()),
                    e.to_string(),
                );
            }
        }
    }

    /// Turn everything found for `name` into a component, if it is usable.
    fn assemble(
        &self,
        name: &str,
        result: ComponentResult,
        report: &mut ScanReport,
    ) -> Option<SoftwareComponent> {
        if result.is_undefined() {
            debug!("Folder '{}' defines no software component", name);
            report.diagnose(
                DiagnosticKind::InvalidComponent,
                Some(name),
                result.folders.first().cloned(),
                "No native definition and no command descriptors found",
            );
            return None;
        }

        let mut component = result
            .component
            .unwrap_or_else(|| SoftwareComponent::new(name));
        for folder in result.folders {
            component.add_folder(folder);
        }
        for file in result.files {
            component.add_file(file);
        }

        for pending in result.commands {
            match self.providers.create(
                &pending.provider,
                pending.command_type,
                &pending.configuration,
            ) {
                Ok(action) => {
                    let command = Command::from_action(pending.command_type, name, action);
                    if !component.add_command(command, false) {
                        debug!(
                            "Ignoring '{}' from '{}', '{}' already has that command",
                            pending.command_type,
                            pending.source.display(),
                            name
                        );
                    }
                }
                Err(e) => {
                    warn!("Dropping command descriptor '{}': {}", pending.source.display(), e);
                    report.diagnose(
                        DiagnosticKind::DroppedDescriptor,
                        Some(name),
                        Some(pending.source),
                        e.to_string(),
                    );
                }
            }
        }

        if !component.is_valid() {
            warn!("Software component '{}' has no usable commands", name);
            report.diagnose(
                DiagnosticKind::InvalidComponent,
                Some(name),
                component.folders().first().cloned(),
                "No usable commands",
            );
            return None;
        }

        trace!("Found software component '{}'", name);
        Some(component)
    }
}

/// Whether `path` is an existing directory named `components` or marked as a root.
pub fn is_valid_search_path(path: &Path) -> bool {
    if !path.exists() {
        trace!("Component search path '{}' does not exist", path.display());
        return false;
    }
    if !path.is_dir() {
        trace!("Component search path '{}' is not a directory", path.display());
        return false;
    }
    let named_components = path.file_name().is_some_and(|n| n == "components");
    if !named_components && !path.join(COMPONENT_ROOT_MARKER).is_file() {
        trace!(
            "'{}' is neither named 'components' nor contains '{}'",
            path.display(),
            COMPONENT_ROOT_MARKER
        );
        return false;
    }
    true
}

fn contains_software_component(path: &Path) -> bool {
    path.is_dir()
        && !path
            .file_name()
            .is_some_and(|n| n.to_string_lossy().starts_with(IGNORE_PREFIX))
}

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yml") | Some("yaml")
    )
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .collect::<Vec<_>>();
    entries.sort();
    Ok(entries)
}

/// Files below `dir`. Symlinked directories are not descended into.
fn collect_files(dir: &Path, files: &mut Vec<PathBuf>) {
    let Ok(entries) = sorted_entries(dir) else {
        return;
    };
    for entry in entries {
        let is_link = fs::symlink_metadata(&entry)
            .map(|meta| meta.file_type().is_symlink())
            .unwrap_or(false);
        if is_link && entry.is_dir() {
            trace!("Not following symlinked directory '{}'", entry.display());
            continue;
        }
        if entry.is_dir() {
            collect_files(&entry, files);
        } else if entry.is_file() {
            files.push(entry);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{OperatingSystem, StaticHost};
    use std::sync::Arc;
    use tempfile::TempDir;

    fn write(path: &Path, content: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn registry() -> Registry {
        Registry::new(Arc::new(StaticHost::new(OperatingSystem::Linux)))
    }

    const SHELL_INSTALL: &str = "command:\n  type: install\n  provider: shell\n  configuration:\n    script: echo install\n";

    #[test]
    fn search_path_validity() {
        let temp = TempDir::new().unwrap();
        let components = temp.path().join("components");
        let marked = temp.path().join("mine");
        let plain = temp.path().join("plain");
        fs::create_dir_all(&components).unwrap();
        fs::create_dir_all(&plain).unwrap();
        write(&marked.join(COMPONENT_ROOT_MARKER), "");

        assert!(is_valid_search_path(&components));
        assert!(is_valid_search_path(&marked));
        assert!(!is_valid_search_path(&plain));
        assert!(!is_valid_search_path(&temp.path().join("missing")));
        assert!(!is_valid_search_path(&marked.join(COMPONENT_ROOT_MARKER)));
    }

    #[test]
    fn ignored_and_plain_files_are_skipped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("components");
        write(&root.join("__pycache__/install.yml"), SHELL_INSTALL);
        write(&root.join("README.md"), "not a component");
        write(&root.join("tool/install.yml"), SHELL_INSTALL);

        let catalog = NativeCatalog::empty();
        let providers = ProviderRegistry::builtin();
        let mut registry = registry();
        let report = ComponentScanner::new(&catalog, &providers).scan(&[root], &mut registry);

        assert_eq!(report.components, ["tool"]);
        assert!(report.is_clean());
    }

    #[test]
    fn files_are_collected_recursively() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("components");
        write(&root.join("tool/install.yml"), SHELL_INSTALL);
        write(&root.join("tool/templates/config.toml"), "x = 1");

        let catalog = NativeCatalog::empty();
        let providers = ProviderRegistry::builtin();
        let mut registry = registry();
        ComponentScanner::new(&catalog, &providers).scan(&[root.clone()], &mut registry);

        let tool = registry.find_component("tool").unwrap();
        assert_eq!(tool.files().len(), 2);
        assert_eq!(
            tool.get_file("templates/*.toml"),
            Some(root.join("tool/templates/config.toml").as_path())
        );
    }

    #[test]
    fn native_plugins_are_seeded() {
        let catalog = NativeCatalog::builtin();
        let providers = ProviderRegistry::builtin();
        let mut registry = registry();
        let report = ComponentScanner::new(&catalog, &providers).scan(&[], &mut registry);

        assert_eq!(report.components, ["chocolatey", "git", "sdkman"]);
    }

    #[test]
    fn descriptor_commands_attach_to_native_components() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("components");
        write(
            &root.join("git/uninstall.yml"),
            "command:\n  type: uninstall\n  provider: shell\n  configuration:\n    script: apt remove -y git\n",
        );
        write(&root.join("git/install.yml"), SHELL_INSTALL);

        let catalog = NativeCatalog::builtin();
        let providers = ProviderRegistry::builtin();
        let mut registry = registry();
        ComponentScanner::new(&catalog, &providers).scan(&[root.clone()], &mut registry);

        let git = registry.find_component("git").unwrap();
        assert!(git.command(CommandType::Uninstall).is_some());
        assert_eq!(git.folders(), [root.join("git")]);
        // The native install command wins over the descriptor.
        assert_eq!(git.command(CommandType::Install).unwrap().help(), "Install Git.");
    }

    #[test]
    fn plugin_descriptor_binds_folder_name() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("components");
        write(
            &root.join("scm/component.yml"),
            "component:\n  plugin: git\n  description: Source control.\n",
        );
        write(&root.join("other/component.yml"), "component:\n  plugin: nope\n");

        let catalog = NativeCatalog::builtin();
        let providers = ProviderRegistry::builtin();
        let mut registry = registry();
        let report = ComponentScanner::new(&catalog, &providers).scan(&[root], &mut registry);

        let scm = registry.find_component("scm").unwrap();
        assert_eq!(scm.help(), "Source control.");
        assert!(scm.command(CommandType::Configure).is_some());

        assert!(registry.find_component("other").is_none());
        assert_eq!(report.diagnostics_of(DiagnosticKind::DroppedDescriptor).count(), 1);
        assert_eq!(report.diagnostics_of(DiagnosticKind::InvalidComponent).count(), 1);
    }

    #[test]
    fn invalid_descriptors_are_diagnosed() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("components");
        write(
            &root.join("tool/bad.yml"),
            "command:\n  type: deploy\n  provider: shell\n",
        );
        write(&root.join("tool/broken.yaml"), "command: [unclosed\n");
        write(&root.join("tool/install.yml"), SHELL_INSTALL);

        let catalog = NativeCatalog::empty();
        let providers = ProviderRegistry::builtin();
        let mut registry = registry();
        let report = ComponentScanner::new(&catalog, &providers).scan(&[root], &mut registry);

        assert_eq!(report.components, ["tool"]);
        assert_eq!(report.diagnostics_of(DiagnosticKind::InvalidDescriptor).count(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_not_followed() {
        let temp = TempDir::new().unwrap();
        let tool = temp.path().join("components/tool");
        write(&tool.join("install.yml"), SHELL_INSTALL);
        std::os::unix::fs::symlink(&tool, tool.join("loop")).unwrap();

        let mut files = Vec::new();
        collect_files(&tool, &mut files);

        assert_eq!(files, [tool.join("install.yml")]);
    }

    #[test]
    fn invalid_provider_configuration_is_dropped() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("components");
        write(
            &root.join("dive/install.yml"),
            "command:\n  type: install\n  provider: github\n  configuration:\n    repository: wagoodman/dive\n",
        );

        let catalog = NativeCatalog::empty();
        let providers = ProviderRegistry::builtin();
        let mut registry = registry();
        let report = ComponentScanner::new(&catalog, &providers).scan(&[root], &mut registry);

        assert!(report.components.is_empty());
        assert_eq!(report.diagnostics_of(DiagnosticKind::DroppedDescriptor).count(), 1);
        assert_eq!(report.diagnostics_of(DiagnosticKind::InvalidComponent).count(), 1);
    }
}
