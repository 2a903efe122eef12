//! Output modes.

use std::str::FromStr;

/// Output verbosity mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputMode {
    /// Show progress and status.
    #[default]
    Normal,
    /// Show nothing except errors and requested data.
    Quiet,
}

impl FromStr for OutputMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "quiet" => Ok(Self::Quiet),
            _ => Err(format!("unknown output mode: {}", s)),
        }
    }
}

impl OutputMode {
    /// Check if this mode shows progress spinners.
    pub fn shows_spinners(&self) -> bool {
        matches!(self, Self::Normal)
    }

    /// Check if this mode shows status messages.
    pub fn shows_status(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_modes() {
        assert_eq!("quiet".parse::<OutputMode>(), Ok(OutputMode::Quiet));
        assert_eq!("Normal".parse::<OutputMode>(), Ok(OutputMode::Normal));
        assert!("loud".parse::<OutputMode>().is_err());
    }

    #[test]
    fn quiet_hides_status() {
        assert!(OutputMode::Normal.shows_status());
        assert!(!OutputMode::Quiet.shows_status());
        assert!(!OutputMode::Quiet.shows_spinners());
    }
}
