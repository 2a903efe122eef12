//! Scan outcome reporting.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Kinds of non-fatal scan problems.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A descriptor file was unreadable or violated its schema.
    InvalidDescriptor,
    /// A descriptor named an unknown provider, command type or plugin.
    DroppedDescriptor,
    /// A native plugin failed to construct its component.
    FailedPlugin,
    /// A component ended up with no usable commands.
    InvalidComponent,
}

/// A problem found during a scan that did not stop it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanDiagnostic {
    pub kind: DiagnosticKind,
    pub component: Option<String>,
    pub path: Option<PathBuf>,
    pub message: String,
}

impl fmt::Display for ScanDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(component) = &self.component {
            write!(f, "[{}] ", component)?;
        }
        write!(f, "{}", self.message)?;
        if let Some(path) = &self.path {
            write!(f, " ({})", path.display())?;
        }
        Ok(())
    }
}

/// What a scan registered and what it skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScanReport {
    /// Registered component names, in registration order.
    pub components: Vec<String>,
    pub diagnostics: Vec<ScanDiagnostic>,
}

impl ScanReport {
    pub(crate) fn diagnose(
        &mut self,
        kind: DiagnosticKind,
        component: Option<&str>,
        path: Option<PathBuf>,
        message: impl Into<String>,
    ) {
        self.diagnostics.push(ScanDiagnostic {
            kind,
            component: component.map(str::to_string),
            path,
            message: message.into(),
        });
    }

    pub fn diagnostics_of(&self, kind: DiagnosticKind) -> impl Iterator<Item = &ScanDiagnostic> {
        self.diagnostics.iter().filter(move |d| d.kind == kind)
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diagnostic_display() {
        let diagnostic = ScanDiagnostic {
            kind: DiagnosticKind::DroppedDescriptor,
            component: Some("dive".to_string()),
            path: Some(PathBuf::from("/c/dive/install.yml")),
            message: "No provider 'ansible' for 'install' commands".to_string(),
        };
        assert_eq!(
            diagnostic.to_string(),
            "[dive] No provider 'ansible' for 'install' commands (/c/dive/install.yml)"
        );
    }

    #[test]
    fn filter_by_kind() {
        let mut report = ScanReport::default();
        report.diagnose(DiagnosticKind::FailedPlugin, None, None, "boom");
        report.diagnose(DiagnosticKind::InvalidComponent, Some("x"), None, "empty");

        assert!(!report.is_clean());
        assert_eq!(report.diagnostics_of(DiagnosticKind::FailedPlugin).count(), 1);
        assert_eq!(report.diagnostics_of(DiagnosticKind::InvalidDescriptor).count(), 0);
    }
}
