//! Launcher configuration.
//!
//! The launcher works without any configuration file. When present,
//! `launcher.toml` overrides individual settings; missing sections and fields
//! keep their defaults.
//!
//! # Locations
//!
//! The file is looked up in this order:
//! 1. The `--config` command line option
//! 2. The `BANG_LAUNCHER_CONFIG` environment variable
//! 3. `launcher.toml` next to the launcher executable
//!
//! A missing file is not an error; an unreadable or invalid one is.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bang_launcher::config::LauncherConfig;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = LauncherConfig::load(None).await?;
//! let install_dir = config.install_dir(None)?;
//! println!("Installing into {}", install_dir.display());
//! # Ok(())
//! # }
//! ```

mod launcher;

pub use launcher::{
    DataPackConfig, FeedConfig, FeedKind, InstallConfig, LaunchConfig, LaunchMethod,
    LauncherConfig, NetworkConfig, VersionConfig, VersionSource,
};

use anyhow::{Context, Result, bail};
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use crate::utils::fs::executable_dir;

/// Environment variable overriding the configuration file location.
pub const CONFIG_ENV_VAR: &str = "BANG_LAUNCHER_CONFIG";

/// File name looked up next to the executable.
pub const CONFIG_FILE_NAME: &str = "launcher.toml";

impl LauncherConfig {
    /// Load the configuration from an explicit path or the default locations.
    ///
    /// Returns the defaults when no file exists at the resolved location.
    pub async fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => Self::default_path()?,
        };

        let config = if path.exists() {
            Self::load_from(&path).await?
        } else {
            debug!("No configuration at {}, using defaults", path.display());
            Self::default()
        };

        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from a specific file.
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read launcher config from {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse launcher config from {}", path.display()))
    }

    /// Resolve the configuration path from the environment or the executable location.
    pub fn default_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Ok(PathBuf::from(path));
        }
        Ok(executable_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Reject combinations the pipeline cannot honour.
    pub fn validate(&self) -> Result<()> {
        if self.data_pack.enabled && !self.feed.track_commit {
            bail!(
                "[data_pack] enabled = true requires [feed] track_commit = true: \
                 the data pack version is read from the release commit tree"
            );
        }
        if cfg!(not(feature = "dylib")) {
            if self.data_pack.enabled {
                bail!(
                    "[data_pack] enabled = true needs a launcher built with the dylib feature: \
                     the installed data pack version is read from the game library"
                );
            }
            if self.version.source == VersionSource::Introspection {
                bail!(
                    "[version] source = \"introspection\" needs a launcher built with the dylib feature"
                );
            }
        }
        if self.install.marker_file.trim().is_empty() {
            bail!("[install] marker_file must not be empty");
        }
        if self.data_pack.file.trim().is_empty() {
            bail!("[data_pack] file must not be empty");
        }
        Ok(())
    }

    /// Pick the install directory.
    ///
    /// The command line override wins over `install.dir`, which wins over the
    /// directory of the running executable.
    pub fn install_dir(&self, cli_override: Option<&Path>) -> Result<PathBuf> {
        if let Some(dir) = cli_override {
            return Ok(dir.to_path_buf());
        }
        if let Some(dir) = &self.install.dir {
            return Ok(dir.clone());
        }
        executable_dir()
    }

    /// URL of the release listing endpoint.
    pub fn release_url(&self) -> String {
        let suffix = match self.feed.kind {
            FeedKind::Latest => "releases/latest",
            FeedKind::List => "releases",
        };
        format!("{}/{}", self.repo_api_url(), suffix)
    }

    /// URL of the git tree of a commit.
    pub fn tree_url(&self, commit: &str) -> String {
        format!("{}/git/trees/{commit}", self.repo_api_url())
    }

    fn repo_api_url(&self) -> String {
        format!(
            "{}/repos/{}/{}",
            self.feed.api_base.trim_end_matches('/'),
            self.feed.owner,
            self.feed.repo
        )
    }
}
