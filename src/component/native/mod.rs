//! Compiled-in component plugins.
//!
//! A native plugin constructs a fully formed [`SoftwareComponent`]. The
//! scanner seeds every catalog plugin into a scan, and a
//! `component: {plugin: <id>}` descriptor binds a plugin to a component
//! folder under that folder's name.

mod chocolatey;
mod git;
mod sdkman;

pub use chocolatey::ChocolateyPlugin;
pub use git::GitPlugin;
pub use sdkman::SdkmanPlugin;

use crate::component::SoftwareComponent;
use crate::error::Result;

/// A statically linked component definition.
pub trait NativePlugin: Send + Sync {
    /// Plugin identifier, also the default component name.
    fn id(&self) -> &'static str;

    /// Construct the component under `name`.
    ///
    /// Fails when the plugin cannot be used in this build at all.
    fn build(&self, name: &str) -> Result<SoftwareComponent>;
}

/// The set of native plugins available to the scanner.
#[derive(Default)]
pub struct NativeCatalog {
    plugins: Vec<Box<dyn NativePlugin>>,
}

impl NativeCatalog {
    /// A catalog without any plugins.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The plugins shipped with this binary.
    pub fn builtin() -> Self {
        let mut catalog = Self::empty();
        catalog.register(Box::new(SdkmanPlugin));
        catalog.register(Box::new(GitPlugin));
        catalog.register(Box::new(ChocolateyPlugin));
        catalog
    }

    /// Add `plugin`, replacing any plugin with the same id.
    pub fn register(&mut self, plugin: Box<dyn NativePlugin>) {
        self.plugins.retain(|p| p.id() != plugin.id());
        self.plugins.push(plugin);
    }

    pub fn find(&self, id: &str) -> Option<&dyn NativePlugin> {
        self.plugins
            .iter()
            .find(|p| p.id() == id)
            .map(|p| p.as_ref())
    }

    pub fn plugins(&self) -> impl Iterator<Item = &dyn NativePlugin> {
        self.plugins.iter().map(|p| p.as_ref())
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
