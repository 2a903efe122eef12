//! Environment discovery.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{trace, warn};

use super::software::SoftwareEnvironment;
use crate::registry::Registry;

/// Environments found on disk.
#[derive(Debug, Default)]
pub struct EnvironmentCatalog {
    environments: Vec<SoftwareEnvironment>,
    /// Manifests that could not be loaded, with the reason.
    skipped: Vec<(PathBuf, String)>,
}

impl EnvironmentCatalog {
    pub fn find(&self, name: &str) -> Option<&SoftwareEnvironment> {
        self.environments.iter().find(|e| e.name == name)
    }

    pub fn environments(&self) -> &[SoftwareEnvironment] {
        &self.environments
    }

    pub fn skipped(&self) -> &[(PathBuf, String)] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.environments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.environments.is_empty()
    }

    fn insert(&mut self, environment: SoftwareEnvironment) {
        if let Some(existing) = self.find(&environment.name) {
            warn!(
                "Ignoring environment '{}' from '{}', already defined in '{}'",
                environment.name,
                environment.path.display(),
                existing.path.display()
            );
            return;
        }
        self.environments.push(environment);
    }
}

/// Loads every manifest found in a list of environment roots.
pub struct EnvironmentScanner {
    roots: Vec<PathBuf>,
}

impl EnvironmentScanner {
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Load all manifests, resolving components against `registry`.
    ///
    /// Invalid manifests are skipped with a warning. When two manifests
    /// share a name, the one from the earlier root wins.
    pub fn scan(&self, registry: &Registry) -> EnvironmentCatalog {
        let mut catalog = EnvironmentCatalog::default();
        for root in &self.roots {
            if !root.is_dir() {
                trace!("Environment search path '{}' is not a directory", root.display());
                continue;
            }
            for path in manifests_in(root) {
                match SoftwareEnvironment::from_file(&path, registry) {
                    Ok(environment) => catalog.insert(environment),
                    Err(e) => {
                        warn!("Skipping environment '{}': {}", path.display(), e);
                        catalog.skipped.push((path, e.to_string()));
                    }
                }
            }
        }
        catalog
    }
}

fn manifests_in(root: &Path) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(root) else {
        return Vec::new();
    };
    let mut manifests: Vec<PathBuf> = entries
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| {
            path.is_file()
                && matches!(
                    path.extension().and_then(|e| e.to_str()),
                    Some("yml") | Some("yaml")
                )
        })
        .collect();
    manifests.sort();
    manifests
}
