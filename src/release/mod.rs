//! Release resolution against the GitHub releases API.
//!
//! [`ReleaseResolver::resolve_latest`] turns the release feed into a
//! [`ReleaseInfo`]: the release name, optionally the release commit, the main
//! archive asset and, when the data pack is enabled, the second asset plus the
//! commit of the card resources it was built from.
//!
//! # Failure mapping
//!
//! | Situation | Error |
//! |---|---|
//! | GET failed or non-success status | [`LauncherError::TransportError`] |
//! | Body is not JSON | [`LauncherError::MalformedResponse`] |
//! | JSON without the expected fields or assets | [`LauncherError::NoReleaseFound`] |
//!
//! # Request flow
//!
//! ```text
//! GET /repos/{owner}/{repo}/releases/latest        -> name, target_commitish, assets[0..2]
//! GET /repos/{owner}/{repo}/git/trees/{commit}     -> entry "resources"     (data pack only)
//! GET {resources.url}                              -> entry "cards" -> sha  (data pack only)
//! ```

mod parse;
mod tree;


pub use parse::parse_release;
pub use tree::{Tree, TreeEntry};

use tracing::{debug, info};

use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::transport::Transport;

/// Second downloadable asset of a release.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataPackAsset {
    pub url: String,
    pub size: u64,
}

/// Everything the launcher needs to know about the latest release.
///
/// Built once per run and never modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseInfo {
    /// Release name, e.g. `v1.2`.
    pub version_label: String,
    /// Release commit (`target_commitish`), when commit tracking is enabled.
    pub commit_id: Option<String>,
    /// Download URL of asset 0.
    pub archive_url: String,
    /// Declared size of asset 0 in bytes.
    pub archive_size: u64,
    /// Asset 1, when present and the data pack is enabled.
    pub data_pack: Option<DataPackAsset>,
    /// Tree sha of the card resources at `commit_id`.
    pub data_pack_commit_id: Option<String>,
}

impl ReleaseInfo {
    /// Value recorded in the version marker for this release.
    ///
    /// The commit when it is tracked, the release name otherwise.
    pub fn marker_value(&self) -> &str {
        self.commit_id.as_deref().unwrap_or(&self.version_label)
    }

    /// Declared data pack size, 0 when the release has none.
    pub fn data_pack_size(&self) -> u64 {
        self.data_pack.as_ref().map_or(0, |pack| pack.size)
    }
}

/// Resolves the latest release through a [`Transport`].
pub struct ReleaseResolver<'a, T: Transport> {
    transport: &'a T,
    config: &'a LauncherConfig,
}

impl<'a, T: Transport> ReleaseResolver<'a, T> {
    pub fn new(transport: &'a T, config: &'a LauncherConfig) -> Self {
        Self { transport, config }
    }

    /// Query the feed and build the [`ReleaseInfo`].
    ///
    /// When the data pack is enabled the content commit lookup runs as part of
    /// the resolution; a miss anywhere in that chain fails the whole call.
    pub async fn resolve_latest(&self) -> Result<ReleaseInfo, LauncherError> {
        let url = self.config.release_url();
        debug!("Resolving latest release from {url}");

        let root = self.fetch_json(&url).await?;
        let mut info = parse_release(
            &root,
            self.config.feed.kind,
            self.config.feed.track_commit,
            self.config.data_pack.enabled,
        )?;

        if self.config.data_pack.enabled {
            let commit = info.commit_id.clone().ok_or_else(|| {
                LauncherError::no_release("release commit is required to version the data pack")
            })?;
            info.data_pack_commit_id = Some(self.resolve_content_commit(&commit).await?);
        }

        info!("Latest release: {} ({})", info.version_label, info.marker_value());
        Ok(info)
    }

    /// Follow `commit -> tree_root -> tree_entry` and return the entry's sha.
    pub async fn resolve_content_commit(&self, commit: &str) -> Result<String, LauncherError> {
        let data_pack = &self.config.data_pack;

        let root_tree = self.fetch_tree(&self.config.tree_url(commit)).await?;
        let resources = root_tree.entry(&data_pack.tree_root)?;
        let resources_url = resources.url.as_deref().ok_or_else(|| {
            LauncherError::no_release(format!("tree entry '{}' has no url", resources.path))
        })?;

        let resources_tree = self.fetch_tree(resources_url).await?;
        let cards = resources_tree.entry(&data_pack.tree_entry)?;
        let sha = cards.sha.clone().ok_or_else(|| {
            LauncherError::no_release(format!("tree entry '{}' has no sha", cards.path))
        })?;

        debug!("Data pack content commit: {sha}");
        Ok(sha)
    }

    async fn fetch_tree(&self, url: &str) -> Result<Tree, LauncherError> {
        let value = self.fetch_json(url).await?;
        Tree::from_value(value)
    }

    async fn fetch_json(&self, url: &str) -> Result<serde_json::Value, LauncherError> {
        let body = self.transport.fetch(url, None, None).await?;
        serde_json::from_slice(&body).map_err(|source| LauncherError::MalformedResponse {
            url: url.to_string(),
            source,
        })
    }
}
