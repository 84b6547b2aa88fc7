//! Update decision.
//!
//! Decisions are pure functions of the resolved release and a snapshot of the
//! local install ([`LocalState`]). The main archive and the data pack are
//! decided independently.

use std::path::Path;
use tracing::debug;

use crate::config::{LauncherConfig, VersionSource};
use crate::release::ReleaseInfo;
use crate::utils::fs::file_size;
use crate::version::{LocalVersion, VersionIntrospector, VersionStore};

/// Whether the main archive has to be downloaded and installed.
///
/// True when nothing is installed or the installed key differs from the
/// release key. Comparison is exact string equality.
pub fn needs_main_update(remote: &ReleaseInfo, local: &LocalVersion) -> bool {
    match local {
        LocalVersion::Missing => true,
        LocalVersion::Installed(installed) => installed != remote.marker_value(),
    }
}

/// Whether the data pack has to be downloaded and installed.
///
/// A release without a data pack never needs one. Otherwise a missing file,
/// an unknown installed content version, or a different one all mean update.
pub fn needs_data_pack_update(
    remote: &ReleaseInfo,
    data_pack_present: bool,
    installed_content: Option<&str>,
) -> bool {
    if remote.data_pack_size() == 0 {
        return false;
    }
    if !data_pack_present {
        return true;
    }
    match (installed_content, remote.data_pack_commit_id.as_deref()) {
        (Some(installed), Some(remote)) => installed != remote,
        _ => true,
    }
}

/// Snapshot of what is installed locally.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalState {
    pub main: LocalVersion,
    pub data_pack_present: bool,
    pub content_version: Option<String>,
}

impl LocalState {
    /// Gather the local facts the decision depends on.
    ///
    /// With [`VersionSource::Introspection`] the installed application is
    /// asked first and the marker is the fallback.
    pub fn inspect(
        install_dir: &Path,
        store: &VersionStore,
        introspector: &dyn VersionIntrospector,
        config: &LauncherConfig,
    ) -> Self {
        if !install_dir.is_dir() {
            debug!("Install directory {} does not exist", install_dir.display());
            return Self {
                main: LocalVersion::Missing,
                data_pack_present: false,
                content_version: None,
            };
        }

        let main = match config.version.source {
            VersionSource::Marker => store.local_version(),
            VersionSource::Introspection => introspector
                .installed_main_version(install_dir)
                .map(LocalVersion::Installed)
                .unwrap_or_else(|| store.local_version()),
        };

        let (data_pack_present, content_version) = if config.data_pack.enabled {
            let present = file_size(&install_dir.join(&config.data_pack.file)).is_some();
            let content = if present {
                introspector.installed_content_version(install_dir)
            } else {
                None
            };
            (present, content)
        } else {
            (false, None)
        };

        debug!(
            "Local state: main={:?} data_pack_present={data_pack_present} content={content_version:?}",
            main
        );
        Self {
            main,
            data_pack_present,
            content_version,
        }
    }
}

/// What a run is going to download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct UpdatePlan {
    pub main: bool,
    pub data_pack: bool,
}

impl UpdatePlan {
    pub fn decide(remote: &ReleaseInfo, local: &LocalState) -> Self {
        Self {
            main: needs_main_update(remote, &local.main),
            data_pack: needs_data_pack_update(
                remote,
                local.data_pack_present,
                local.content_version.as_deref(),
            ),
        }
    }

    /// Nothing to download; go straight to launching.
    pub fn is_empty(&self) -> bool {
        !self.main && !self.data_pack
    }
}
