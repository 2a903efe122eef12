//! Platform issue types.

use std::fmt;

/// Operating systems a component can require.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatingSystem {
    Linux,
    Windows,
    MacOS,
}

impl OperatingSystem {
    /// The operating system this binary was compiled for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            OperatingSystem::Windows
        } else if cfg!(target_os = "macos") {
            OperatingSystem::MacOS
        } else {
            OperatingSystem::Linux
        }
    }
}

impl fmt::Display for OperatingSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OperatingSystem::Linux => write!(f, "Linux"),
            OperatingSystem::Windows => write!(f, "Windows"),
            OperatingSystem::MacOS => write!(f, "macOS"),
        }
    }
}

impl std::str::FromStr for OperatingSystem {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(OperatingSystem::Linux),
            "windows" => Ok(OperatingSystem::Windows),
            "macos" | "darwin" | "osx" => Ok(OperatingSystem::MacOS),
            other => Err(format!("Unknown operating system: {}", other)),
        }
    }
}

/// A reason the current host cannot run a component's commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformIssue {
    /// Human-readable description of the issue.
    pub description: String,
    /// Whether the user can fix the issue (e.g. by installing a tool).
    pub fixable: bool,
    /// How to fix the issue, if known.
    pub fix_instructions: Option<String>,
}

impl PlatformIssue {
    /// Create an issue that cannot be fixed by the user.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            fixable: false,
            fix_instructions: None,
        }
    }

    /// Mark the issue as fixable with the given instructions.
    pub fn with_fix(mut self, instructions: impl Into<String>) -> Self {
        self.fixable = true;
        self.fix_instructions = Some(instructions.into());
        self
    }

    /// The host runs an operating system the component does not support.
    pub fn unsupported_operating_system(
        current: OperatingSystem,
        supported: &[OperatingSystem],
    ) -> Self {
        let mut message = format!("{} is not supported", current);
        match supported {
            [] => {}
            [only] => message.push_str(&format!(", only {} is", only)),
            many => {
                let names: Vec<String> = many.iter().map(|os| os.to_string()).collect();
                message.push_str(&format!(", only one of {} is", names.join(", ")));
            }
        }
        message.push('!');
        Self::new(message)
    }

    /// A required command is not on `PATH`.
    pub fn command_not_available(
        command: &str,
        fixable: bool,
        instructions: Option<&str>,
    ) -> Self {
        Self {
            description: format!("Required command '{}' is not available!", command),
            fixable,
            fix_instructions: instructions.map(str::to_string),
        }
    }
}

impl fmt::Display for PlatformIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description)?;
        if let Some(fix) = &self.fix_instructions {
            write!(f, " ({})", fix)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_os_single() {
        let issue = PlatformIssue::unsupported_operating_system(
            OperatingSystem::Linux,
            &[OperatingSystem::Windows],
        );
        assert_eq!(issue.description, "Linux is not supported, only Windows is!");
        assert!(!issue.fixable);
    }

    #[test]
    fn unsupported_os_many() {
        let issue = PlatformIssue::unsupported_operating_system(
            OperatingSystem::Windows,
            &[OperatingSystem::Linux, OperatingSystem::MacOS],
        );
        assert_eq!(
            issue.description,
            "Windows is not supported, only one of Linux, macOS is!"
        );
    }

    #[test]
    fn command_not_available_carries_fix() {
        let issue = PlatformIssue::command_not_available("choco", true, Some("install choco"));
        assert!(issue.fixable);
        assert_eq!(issue.to_string(), "Required command 'choco' is not available! (install choco)");
    }

    #[test]
    fn parse_operating_system() {
        assert_eq!("Linux".parse(), Ok(OperatingSystem::Linux));
        assert_eq!("darwin".parse(), Ok(OperatingSystem::MacOS));
        assert!("beos".parse::<OperatingSystem>().is_err());
    }
}
