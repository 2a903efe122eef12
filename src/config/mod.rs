//! Configuration loading.
//!
//! Stackwright reads `.stackwright.yml` from the working directory,
//! `~/.stackwright` and `/opt/stackwright`. Files are layered key by key:
//! a key set in an earlier file is never overridden by a later one.
//!
//! # Example
//!
//! ```
//! use stackwright::config::load_configuration;
//! use tempfile::TempDir;
//! use std::fs;
//!
//! let temp = TempDir::new().unwrap();
//! let path = temp.path().join(".stackwright.yml");
//! fs::write(&path, "search_paths: [/srv/stackwright]\n").unwrap();
//!
//! let config = load_configuration(&[path]).unwrap();
//! assert_eq!(
//!     config.component_roots(),
//!     [std::path::PathBuf::from("/srv/stackwright/components")]
//! );
//! ```

pub mod loader;
pub mod schema;

pub use loader::{candidate_paths, discover, load_config_file, load_configuration, CONFIG_FILE_NAME};
pub use schema::{default_search_paths, ConfigFile, Configuration};
