//! Installing release assets from GitHub.
//!
//! The latest release of a repository is looked up through the GitHub REST
//! API in-process; downloading and unpacking the matching asset happens
//! through the command runner so it works on any target.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use serde::Deserialize;
use tracing::{debug, info};

use super::CommandProvider;
use crate::component::{Action, CommandContext, CommandType};
use crate::error::Result;
use crate::platform::{HostProbe, PlatformIssue, PlatformSupportChecker};

/// Default GitHub REST API root.
pub const GITHUB_API: &str = "https://api.github.com";

/// Configuration of a `github` install command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GitHubInstallConfig {
    /// `owner/name`, optionally prefixed with `github.com/` or a full URL.
    pub repository: String,
    /// Glob selecting exactly one release asset.
    pub pattern: String,
    /// Directory the asset is unpacked into.
    pub install_dir: String,
    /// Executable inside `install_dir` to link into `/usr/local/bin`.
    #[serde(default)]
    pub binary: Option<String>,
    /// Drop the archive's single top-level folder when unpacking.
    #[serde(default)]
    pub strip_root_folder: bool,
}

/// A published release.
#[derive(Debug, Clone, Deserialize)]
pub struct Release {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
    #[serde(default)]
    pub assets: Vec<Asset>,
}

/// A downloadable release asset.
#[derive(Debug, Clone, Deserialize)]
pub struct Asset {
    pub name: String,
    pub browser_download_url: String,
}

/// Looks up releases through the GitHub REST API.
#[derive(Debug, Clone)]
pub struct GitHubReleases {
    api_base: String,
}

impl GitHubReleases {
    pub fn new() -> Self {
        Self::with_api_base(GITHUB_API)
    }

    /// Use a different API root, e.g. a GitHub Enterprise instance.
    pub fn with_api_base(api_base: impl Into<String>) -> Self {
        Self {
            api_base: api_base.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// URL of the latest release of `repository`.
    pub fn latest_release_url(&self, repository: &str) -> String {
        let slug = match repository.split_once("github.com/") {
            Some((_, slug)) => slug,
            None => repository,
        };
        format!(
            "{}/repos/{}/releases/latest",
            self.api_base,
            slug.trim_matches('/')
        )
    }

    /// Fetch the latest release of `repository`.
    #[cfg(feature = "github")]
    pub fn latest(&self, repository: &str) -> anyhow::Result<Release> {
        let url = self.latest_release_url(repository);
        debug!("Querying {} for the latest release", url);

        let client = reqwest::blocking::Client::builder()
            .user_agent("stackwright")
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        let mut request = client
            .get(&url)
            .header("Accept", "application/vnd.github+json");
        if let Ok(token) = std::env::var("GITHUB_TOKEN") {
            request = request.bearer_auth(token);
        }

        let response = request.send()?;
        if !response.status().is_success() {
            bail!("HTTP {} fetching {}", response.status(), url);
        }
        Ok(response.json()?)
    }

    #[cfg(not(feature = "github"))]
    pub fn latest(&self, _repository: &str) -> anyhow::Result<Release> {
        bail!("GitHub support is not compiled into this binary")
    }
}

impl Default for GitHubReleases {
    fn default() -> Self {
        Self::new()
    }
}

/// The single asset of `release` whose name matches `pattern`.
pub fn matching_asset<'r>(release: &'r Release, pattern: &str) -> anyhow::Result<&'r Asset> {
    let matches: Vec<&Asset> = release
        .assets
        .iter()
        .filter(|asset| crate::glob::matches(pattern, &asset.name))
        .collect();
    debug!("Found {} assets matching '{}'", matches.len(), pattern);

    match matches.as_slice() {
        [asset] => Ok(*asset),
        [] => bail!("Found zero matching assets for pattern '{}'!", pattern),
        _ => bail!(
            "Found too many matching assets for pattern '{}': {}",
            pattern,
            matches
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        ),
    }
}

/// Tool unpacking a downloaded asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Unpacker {
    Unzip,
    Tar,
}

impl Unpacker {
    const TAR_SUFFIXES: [&'static str; 6] = [".tar", ".tar.gz", ".tgz", ".tar.xz", ".tar.bz2", ".tar.zst"];

    /// The unpacker for an asset name or pattern, if its suffix decides it.
    fn for_name(name: &str) -> Option<Self> {
        if name.ends_with(".zip") {
            Some(Unpacker::Unzip)
        } else if Self::TAR_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            Some(Unpacker::Tar)
        } else {
            None
        }
    }

    fn command(&self) -> &'static str {
        match self {
            Unpacker::Unzip => "unzip",
            Unpacker::Tar => "tar",
        }
    }
}

/// Installs the latest matching release asset of a repository.
pub struct GitHubInstall {
    config: GitHubInstallConfig,
    releases: GitHubReleases,
}

impl GitHubInstall {
    pub fn new(config: GitHubInstallConfig, releases: GitHubReleases) -> Self {
        Self { config, releases }
    }

    pub fn config(&self) -> &GitHubInstallConfig {
        &self.config
    }

    /// Tools that may be needed to unpack whatever `pattern` selects.
    fn unpackers(&self) -> Vec<Unpacker> {
        match Unpacker::for_name(&self.config.pattern) {
            Some(unpacker) => vec![unpacker],
            None => vec![Unpacker::Unzip, Unpacker::Tar],
        }
    }

    /// Shell commands that download and unpack `asset`.
    pub fn install_steps(&self, asset: &Asset) -> Vec<String> {
        let install_dir = &self.config.install_dir;
        let archive = format!("/tmp/stackwright-{}", asset.name);
        let mut steps = vec![
            format!("mkdir -p {}", install_dir),
            format!("curl -fsSL -o {} {}", archive, asset.browser_download_url),
        ];

        if Unpacker::for_name(&asset.name) == Some(Unpacker::Unzip) {
            if self.config.strip_root_folder {
                let staging = format!("{}.d", archive);
                steps.push(format!("unzip -o -q {} -d {}", archive, staging));
                steps.push(format!("cp -r {}/*/. {}", staging, install_dir));
                steps.push(format!("rm -rf {}", staging));
            } else {
                steps.push(format!("unzip -o -q {} -d {}", archive, install_dir));
            }
        } else {
            let strip = if self.config.strip_root_folder {
                " --strip-components=1"
            } else {
                ""
            };
            steps.push(format!("tar -xf {} -C {}{}", archive, install_dir, strip));
        }

        if let Some(binary) = &self.config.binary {
            let link = Path::new(binary)
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| binary.clone());
            steps.push(format!(
                "ln -sf {}/{} /usr/local/bin/{}",
                install_dir.trim_end_matches('/'),
                binary,
                link
            ));
        }

        steps.push(format!("rm -f {}", archive));
        steps
    }
}

impl Action for GitHubInstall {
    fn execute(&self, ctx: &mut CommandContext<'_>) -> Result<()> {
        let release = self.releases.latest(&self.config.repository)?;
        let asset = matching_asset(&release, &self.config.pattern)?;

        info!(
            "Downloading release {} published at {}",
            release.name.as_deref().unwrap_or("<unnamed>"),
            release.published_at.as_deref().unwrap_or("<unknown>")
        );
        for step in self.install_steps(asset) {
            ctx.runner.run(&step)?;
        }
        Ok(())
    }

    fn supports_platform(&self, host: &dyn HostProbe) -> Vec<PlatformIssue> {
        self.unpackers()
            .into_iter()
            .fold(
                PlatformSupportChecker::new(host)
                    .check_capability_is_available(
                        "github",
                        Some("GitHub release lookup is not available in this build!"),
                        true,
                        Some("rebuild with the 'github' feature"),
                    )
                    .check_command_is_available("curl", true, None),
                |checker, unpacker| checker.check_command_is_available(unpacker.command(), true, None),
            )
            .into_issues()
    }

    fn help(&self) -> Option<String> {
        Some(format!(
            "Install the latest release of {}.",
            self.config.repository
        ))
    }
}

/// Provides `github` install commands.
pub struct GitHubProvider {
    releases: GitHubReleases,
}

impl GitHubProvider {
    pub fn new() -> Self {
        Self::with_releases(GitHubReleases::new())
    }

    pub fn with_releases(releases: GitHubReleases) -> Self {
        Self { releases }
    }
}

impl Default for GitHubProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl CommandProvider for GitHubProvider {
    fn name(&self) -> &'static str {
        "github"
    }

    fn supports(&self, command_type: CommandType) -> bool {
        command_type == CommandType::Install
    }

    fn create(
        &self,
        _command_type: CommandType,
        configuration: &serde_yaml::Value,
    ) -> anyhow::Result<Arc<dyn Action>> {
        let config: GitHubInstallConfig = serde_yaml::from_value(configuration.clone())
            .context("expected 'repository', 'pattern', 'install_dir' and optional 'binary', 'strip_root_folder'")?;
        Ok(Arc::new(GitHubInstall::new(config, self.releases.clone())))
    }
}
