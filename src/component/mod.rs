//! Software components and their commands.
//!
//! A [`SoftwareComponent`] owns at most one [`Command`] per lifecycle
//! [`CommandType`]. Commands are turned into runnable [`BuiltCommand`]s
//! against a host; when the host fails the component's or the command's
//! platform checks the built command is a stub that reports every issue.

pub mod command;
pub mod native;
pub mod software;

pub use command::{Action, BuiltCommand, Command, CommandContext, CommandType};
pub use native::{NativeCatalog, NativePlugin};
pub use software::{ComponentOrigin, Requirements, SoftwareComponent};
