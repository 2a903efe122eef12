//! Providers for declarative commands.
//!
//! A command descriptor names a provider and a command type; the provider
//! turns the descriptor's raw `configuration` map into an [`Action`].

pub mod github;
pub mod shell;

pub use github::{GitHubInstall, GitHubInstallConfig, GitHubProvider, GitHubReleases};
pub use shell::{ShellConfig, ShellProvider, ShellScript};

use std::sync::Arc;

use thiserror::Error;

use crate::component::{Action, CommandType};

/// Why a descriptor could not be turned into a command.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("No provider '{provider}' for '{command_type}' commands")]
    Unknown {
        provider: String,
        command_type: CommandType,
    },

    #[error("Invalid '{provider}' configuration: {message}")]
    InvalidConfiguration { provider: String, message: String },
}

/// Builds actions from descriptor configuration.
pub trait CommandProvider: Send + Sync {
    /// Name referenced by descriptors.
    fn name(&self) -> &'static str;

    /// Whether this provider can build commands of `command_type`.
    fn supports(&self, command_type: CommandType) -> bool;

    /// Build an action from raw configuration.
    fn create(
        &self,
        command_type: CommandType,
        configuration: &serde_yaml::Value,
    ) -> anyhow::Result<Arc<dyn Action>>;
}

/// The providers available to the scanner.
pub struct ProviderRegistry {
    providers: Vec<Box<dyn CommandProvider>>,
}

impl ProviderRegistry {
    pub fn empty() -> Self {
        Self {
            providers: Vec::new(),
        }
    }

    /// `github` and `shell`.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(GitHubProvider::new()));
        registry.register(Box::new(ShellProvider));
        registry
    }

    /// Add `provider`, replacing any provider with the same name.
    pub fn register(&mut self, provider: Box<dyn CommandProvider>) {
        self.providers.retain(|p| p.name() != provider.name());
        self.providers.push(provider);
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.name()).collect()
    }

    /// Dispatch to the provider registered for `provider` and `command_type`.
    pub fn create(
        &self,
        provider: &str,
        command_type: CommandType,
        configuration: &serde_yaml::Value,
    ) -> Result<Arc<dyn Action>, ProviderError> {
        let found = self
            .providers
            .iter()
            .find(|p| p.name() == provider && p.supports(command_type))
            .ok_or_else(|| ProviderError::Unknown {
                provider: provider.to_string(),
                command_type,
            })?;

        found
            .create(command_type, configuration)
            .map_err(|e| ProviderError::InvalidConfiguration {
                provider: provider.to_string(),
                message: format!("{:#}", e),
            })
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn yaml(s: &str) -> serde_yaml::Value {
        serde_yaml::from_str(s).unwrap()
    }

    #[test]
    fn builtin_providers() {
        assert_eq!(ProviderRegistry::builtin().names(), ["github", "shell"]);
    }

    #[test]
    fn unknown_provider_type_pair() {
        let registry = ProviderRegistry::builtin();
        let config = yaml("repository: cli/cli\npattern: '*.tar.gz'\ninstall_dir: /opt/gh");

        let err = registry
            .create("github", CommandType::Configure, &config)
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::Unknown { .. }));
        assert_eq!(err.to_string(), "No provider 'github' for 'configure' commands");

        assert!(matches!(
            registry.create("ansible", CommandType::Install, &config),
            Err(ProviderError::Unknown { .. })
        ));
    }

    #[test]
    fn invalid_configuration_is_reported() {
        let registry = ProviderRegistry::builtin();
        let err = registry
            .create("github", CommandType::Install, &yaml("repository: cli/cli"))
            .err()
            .unwrap();
        assert!(matches!(err, ProviderError::InvalidConfiguration { .. }));
        assert!(err.to_string().contains("pattern"));
    }

    #[test]
    fn valid_descriptor_builds_action() {
        let registry = ProviderRegistry::builtin();
        let action = registry
            .create("shell", CommandType::Verify, &yaml("script: dive --version"))
            .unwrap();
        assert!(action.help().is_none());
    }
}
