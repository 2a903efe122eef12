//! Working-container support.
//!
//! Deployments into a container image go through a [`ContainerEngine`]: the
//! small set of primitives needed to create a working container, copy files
//! into it, run commands, commit it to an image and remove it. [`Buildah`]
//! implements them by shelling out to `buildah`.

pub mod buildah;
pub mod recording;
pub mod runner;

pub use buildah::Buildah;
pub use recording::{EngineCall, RecordingEngine};
pub use runner::ContainerCommandRunner;

use std::path::Path;

use crate::error::Result;
use crate::runner::{RunOptions, RunOutput};

/// Primitive operations on working containers.
pub trait ContainerEngine {
    /// Create a working container from `image`, returning its id.
    fn create(&self, image: &str, name: Option<&str>) -> Result<String>;

    /// Copy a host file or directory into the container.
    fn copy(&self, container: &str, src: &Path, dst: &str, chown: Option<&str>) -> Result<()>;

    /// Run `command` inside the container through its shell.
    fn run(
        &self,
        container: &str,
        command: &str,
        env: &[(String, String)],
        options: &RunOptions,
    ) -> Result<RunOutput>;

    /// Commit the container to an image, returning the image id.
    fn commit(&self, container: &str, image_name: Option<&str>) -> Result<String>;

    /// Remove the container.
    fn remove(&self, container: &str) -> Result<()>;
}
