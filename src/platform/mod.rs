//! Platform support checks.
//!
//! Components describe what they need from the host (an operating system,
//! commands on `PATH`, compiled-in capabilities, root privileges) through a
//! fluent [`PlatformSupportChecker`]. The checker never fails; every unmet
//! requirement becomes a [`PlatformIssue`].
//!
//! Checks run against a [`HostProbe`], so identical checks against identical
//! host state always yield identical issues.
//!
//! # Example
//!
//! ```
//! use stackwright::platform::{OperatingSystem, PlatformSupportChecker, StaticHost};
//!
//! let host = StaticHost::new(OperatingSystem::Linux).with_commands(["bash"]);
//! let issues = PlatformSupportChecker::new(&host)
//!     .check_operating_system(&[OperatingSystem::Linux])
//!     .check_command_is_available("bash", true, None)
//!     .check_command_is_available("curl", true, Some("install curl"))
//!     .into_issues();
//!
//! assert_eq!(issues.len(), 1);
//! assert_eq!(issues[0].fix_instructions.as_deref(), Some("install curl"));
//! ```

pub mod checker;
pub mod host;
pub mod issue;

pub use checker::PlatformSupportChecker;
pub use host::{compiled_capabilities, HostProbe, StaticHost, SystemHost};
pub use issue::{OperatingSystem, PlatformIssue};
