//! Configuration file discovery and loading.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::schema::{ConfigFile, Configuration, KNOWN_KEYS};
use crate::error::{Result, StackwrightError};
use crate::validation::{configuration_shape, validate_file};

pub const CONFIG_FILE_NAME: &str = ".stackwright.yml";

/// Configuration files to consider, highest priority first:
///
/// 1. `<cwd>/.stackwright.yml`
/// 2. `~/.stackwright/.stackwright.yml`
/// 3. `/opt/stackwright/.stackwright.yml`
pub fn candidate_paths(cwd: &Path) -> Vec<PathBuf> {
    let mut paths = vec![cwd.join(CONFIG_FILE_NAME)];
    if let Some(home) = dirs::home_dir() {
        paths.push(home.join(".stackwright").join(CONFIG_FILE_NAME));
    }
    paths.push(PathBuf::from("/opt/stackwright").join(CONFIG_FILE_NAME));
    paths
}

/// Load and validate a single configuration file.
///
/// # Errors
///
/// Returns `SchemaValidation` if a known key has the wrong type and
/// `ConfigParse` if the document cannot be deserialized.
pub fn load_config_file(path: &Path) -> Result<ConfigFile> {
    if fs::read_to_string(path)?.trim().is_empty() {
        return Ok(ConfigFile::default());
    }
    let value = validate_file(&configuration_shape(), path)?;

    if let Some(mapping) = value.as_mapping() {
        for key in mapping.keys().filter_map(|k| k.as_str()) {
            if !KNOWN_KEYS.contains(&key) {
                warn!("Unknown configuration key '{}' in '{}'", key, path.display());
            }
        }
    }

    let mut file: ConfigFile =
        serde_yaml::from_value(value).map_err(|e| StackwrightError::ConfigParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    if let Some(base) = path.parent() {
        file.resolve_relative_to(base);
    }
    Ok(file)
}

/// Layer the existing files among `paths`, first path winning.
pub fn load_configuration(paths: &[PathBuf]) -> Result<Configuration> {
    let mut merged = ConfigFile::default();
    let mut sources = Vec::new();

    for path in paths.iter().filter(|p| p.is_file()) {
        debug!("Loading configuration from '{}'", path.display());
        merged.layer_under(load_config_file(path)?);
        sources.push(path.clone());
    }

    Ok(Configuration::from_file(merged, sources))
}

/// Discover and load the configuration for a process started in `cwd`.
pub fn discover(cwd: &Path) -> Result<Configuration> {
    load_configuration(&candidate_paths(cwd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn first_file_wins_per_key() {
        let temp = TempDir::new().unwrap();
        let first = temp.path().join("first.yml");
        let second = temp.path().join("second.yml");
        fs::write(&first, "verbosity: 2\n").unwrap();
        fs::write(
            &second,
            "verbosity: 0\ncomponent_search_paths: [/srv/components]\n",
        )
        .unwrap();

        let config = load_configuration(&[first.clone(), temp.path().join("missing.yml"), second.clone()])
            .unwrap();
        assert_eq!(config.verbosity, 2);
        assert_eq!(config.component_search_paths, [PathBuf::from("/srv/components")]);
        assert_eq!(config.sources, [first, second]);
    }

    #[test]
    fn unknown_keys_are_tolerated() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "verbosity: 1\ncolour: always\n").unwrap();

        let file = load_config_file(&path).unwrap();
        assert_eq!(file.verbosity, Some(1));
    }

    #[test]
    fn wrong_types_are_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "search_paths: nowhere\n").unwrap();

        assert!(matches!(
            load_config_file(&path),
            Err(StackwrightError::SchemaValidation { .. })
        ));
    }

    #[test]
    fn relative_paths_resolve_against_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "search_paths: [shared]\n").unwrap();

        let config = load_configuration(&[path]).unwrap();
        assert_eq!(config.search_paths, [temp.path().join("shared")]);
        assert_eq!(config.component_roots(), [temp.path().join("shared/components")]);
    }

    #[test]
    fn empty_file_is_valid() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE_NAME);
        fs::write(&path, "\n").unwrap();
        assert_eq!(load_config_file(&path).unwrap(), ConfigFile::default());
    }

    #[test]
    fn no_files_means_defaults() {
        let temp = TempDir::new().unwrap();
        let config = load_configuration(&[temp.path().join(CONFIG_FILE_NAME)]).unwrap();
        assert_eq!(config, Configuration::default());
    }
}
