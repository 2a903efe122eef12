//! Configuration types.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Keys understood in `.stackwright.yml`.
pub const KNOWN_KEYS: &[&str] = &[
    "verbosity",
    "search_paths",
    "component_search_paths",
    "environment_search_paths",
];

/// One configuration file. Unset keys fall through to later files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub verbosity: Option<u8>,
    pub search_paths: Option<Vec<PathBuf>>,
    pub component_search_paths: Option<Vec<PathBuf>>,
    pub environment_search_paths: Option<Vec<PathBuf>>,
}

impl ConfigFile {
    /// Fill keys still unset here from `lower`.
    pub fn layer_under(&mut self, lower: ConfigFile) {
        self.verbosity = self.verbosity.or(lower.verbosity);
        self.search_paths = self.search_paths.take().or(lower.search_paths);
        self.component_search_paths = self
            .component_search_paths
            .take()
            .or(lower.component_search_paths);
        self.environment_search_paths = self
            .environment_search_paths
            .take()
            .or(lower.environment_search_paths);
    }

    /// Make relative paths relative to `base` instead of the working directory.
    pub fn resolve_relative_to(&mut self, base: &Path) {
        for paths in [
            &mut self.search_paths,
            &mut self.component_search_paths,
            &mut self.environment_search_paths,
        ]
        .into_iter()
        .flatten()
        {
            for path in paths.iter_mut() {
                if path.is_relative() {
                    *path = base.join(&*path);
                }
            }
        }
    }
}

/// Effective configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Configuration {
    /// Log verbosity: 0 info, 1 debug, 2 and above trace.
    pub verbosity: u8,
    /// Roots holding `components/` and `environments/` folders.
    pub search_paths: Vec<PathBuf>,
    /// Extra component roots, searched before `search_paths`.
    pub component_search_paths: Vec<PathBuf>,
    /// Extra environment roots, searched before `search_paths`.
    pub environment_search_paths: Vec<PathBuf>,
    /// Configuration files that contributed, highest priority first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<PathBuf>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            verbosity: 0,
            search_paths: default_search_paths(),
            component_search_paths: Vec::new(),
            environment_search_paths: Vec::new(),
            sources: Vec::new(),
        }
    }
}

impl Configuration {
    /// Apply defaults to the merged file layers.
    pub fn from_file(file: ConfigFile, sources: Vec<PathBuf>) -> Self {
        let defaults = Self::default();
        Self {
            verbosity: file.verbosity.unwrap_or(defaults.verbosity),
            search_paths: file.search_paths.unwrap_or(defaults.search_paths),
            component_search_paths: file.component_search_paths.unwrap_or_default(),
            environment_search_paths: file.environment_search_paths.unwrap_or_default(),
            sources,
        }
    }

    /// Put paths given on the command line in front of the configured ones.
    pub fn with_cli_paths(mut self, components: &[PathBuf], environments: &[PathBuf]) -> Self {
        self.component_search_paths
            .splice(0..0, components.iter().cloned());
        self.environment_search_paths
            .splice(0..0, environments.iter().cloned());
        self
    }

    /// Component roots in search order.
    pub fn component_roots(&self) -> Vec<PathBuf> {
        roots(&self.component_search_paths, &self.search_paths, "components")
    }

    /// Environment roots in search order.
    pub fn environment_roots(&self) -> Vec<PathBuf> {
        roots(&self.environment_search_paths, &self.search_paths, "environments")
    }
}

fn roots(explicit: &[PathBuf], search_paths: &[PathBuf], folder: &str) -> Vec<PathBuf> {
    let mut roots: Vec<PathBuf> = Vec::new();
    let derived = search_paths.iter().map(|p| p.join(folder));
    for root in explicit.iter().cloned().chain(derived) {
        if !roots.contains(&root) {
            roots.push(root);
        }
    }
    roots
}

/// `~/.stackwright` and `/opt/stackwright`.
pub fn default_search_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".stackwright"));
    }
    paths.push(PathBuf::from("/opt/stackwright"));
    paths
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn earlier_layer_wins() {
        let mut top = ConfigFile {
            verbosity: Some(2),
            ..Default::default()
        };
        top.layer_under(ConfigFile {
            verbosity: Some(0),
            search_paths: Some(vec![PathBuf::from("/srv/sw")]),
            ..Default::default()
        });

        assert_eq!(top.verbosity, Some(2));
        assert_eq!(top.search_paths, Some(vec![PathBuf::from("/srv/sw")]));
    }

    #[test]
    fn roots_put_explicit_paths_first() {
        let config = Configuration {
            verbosity: 0,
            search_paths: vec![PathBuf::from("/a"), PathBuf::from("/b")],
            component_search_paths: vec![PathBuf::from("/x/components")],
            environment_search_paths: Vec::new(),
            sources: Vec::new(),
        }
        .with_cli_paths(&[PathBuf::from("/cli")], &[PathBuf::from("/a/environments")]);

        assert_eq!(
            config.component_roots(),
            [
                PathBuf::from("/cli"),
                PathBuf::from("/x/components"),
                PathBuf::from("/a/components"),
                PathBuf::from("/b/components"),
            ]
        );
        assert_eq!(
            config.environment_roots(),
            [PathBuf::from("/a/environments"), PathBuf::from("/b/environments")]
        );
    }

    #[test]
    fn relative_paths_follow_the_file() {
        let mut file = ConfigFile {
            search_paths: Some(vec![PathBuf::from("shared"), PathBuf::from("/abs")]),
            ..Default::default()
        };
        file.resolve_relative_to(Path::new("/etc/team"));
        assert_eq!(
            file.search_paths,
            Some(vec![PathBuf::from("/etc/team/shared"), PathBuf::from("/abs")])
        );
    }

    #[test]
    fn defaults_include_opt() {
        let config = Configuration::default();
        assert!(config
            .search_paths
            .contains(&PathBuf::from("/opt/stackwright")));
        assert_eq!(config.verbosity, 0);
    }
}
