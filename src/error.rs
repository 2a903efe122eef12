//! Error types for Stackwright operations.
//!
//! This module defines [`StackwrightError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Scan-time problems never surface as errors from a scan; they are
//!   logged and collected as diagnostics
//! - Manifest validation errors abort only the manifest being processed
//! - Deployment planning errors abort the whole plan before anything runs
//! - Use `anyhow::Error` (via `StackwrightError::Other`) for unexpected errors

use std::path::PathBuf;
use thiserror::Error;

use crate::platform::PlatformIssue;
use crate::validation::Violation;

/// Core error type for Stackwright operations.
#[derive(Debug, Error)]
pub enum StackwrightError {
    /// A component definition could not be read or understood.
    #[error("Failed to scan '{path}': {message}")]
    Scan { path: PathBuf, message: String },

    /// A command was invoked on a host that cannot run it.
    #[error("{}", format_unsupported(.component, .command, .issues))]
    UnsupportedPlatform {
        component: String,
        command: String,
        issues: Vec<PlatformIssue>,
    },

    /// A document violated its schema.
    #[error("{}", format_violations(.path, .violations))]
    SchemaValidation {
        path: PathBuf,
        violations: Vec<Violation>,
    },

    /// A document could not be validated at all (missing, unreadable, not YAML).
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// Failed to parse a configuration file.
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// An environment references components that are not registered.
    #[error("{} of the {total} requested components are unknown, specifically: {}", .names.len(), .names.join(", "))]
    UnknownComponent { names: Vec<String>, total: usize },

    /// A package manager dependency did not resolve to exactly one component.
    #[error("Package manager '{manager}' depends on '{dependency}', which matched {matches} components of the environment (expected exactly one)")]
    DependencyResolution {
        manager: String,
        dependency: String,
        matches: usize,
    },

    /// No usable package manager could be found.
    #[error("No package manager available for '{manager}'{}", format_tried(.tried))]
    PackageManagerUnavailable { manager: String, tried: Vec<String> },

    /// Shell command failed.
    #[error("Command failed with exit code {code:?}: {command}")]
    CommandFailed { command: String, code: Option<i32> },

    /// Interaction with the container engine failed.
    #[error("Container error: {message}")]
    Container { message: String },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Stackwright operations.
pub type Result<T> = std::result::Result<T, StackwrightError>;

fn format_unsupported(component: &str, command: &str, issues: &[PlatformIssue]) -> String {
    let mut message = format!(
        "The '{}' command of the '{}' component does not support this platform:",
        command, component
    );
    for issue in issues {
        message.push_str("\n  - ");
        message.push_str(&issue.description);
        if let Some(fix) = &issue.fix_instructions {
            message.push_str(&format!(" (fix: {})", fix));
        }
    }
    message
}

fn format_violations(path: &std::path::Path, violations: &[Violation]) -> String {
    let mut message = format!("The document at '{}' is invalid:", path.display());
    for violation in violations {
        message.push_str("\n  - ");
        message.push_str(&violation.to_string());
    }
    message
}

fn format_tried(tried: &[String]) -> String {
    if tried.is_empty() {
        String::new()
    } else {
        format!(", tried: {}", tried.join(", "))
    }
}
