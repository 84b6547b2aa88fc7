//! Local version bookkeeping.
//!
//! The [`VersionStore`] owns the version marker: a single line in the install
//! directory naming the release (or commit) that was last installed
//! completely. A missing, unreadable or empty marker means "nothing
//! installed".
//!
//! The [`VersionIntrospector`] capability asks the installed application
//! itself which commit it was built from. The default [`NoIntrospection`]
//! knows nothing; with the `dylib` feature [`LibraryIntrospector`] reads the
//! answer from the installed shared library.

#[cfg(feature = "dylib")]
mod library;

#[cfg(feature = "dylib")]
pub use library::LibraryIntrospector;

use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::utils::fs::atomic_write;

/// What the install directory says about the installed main application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalVersion {
    /// No install directory, no marker, or an empty marker.
    Missing,
    /// Version key recorded by the last complete install.
    Installed(String),
}

impl LocalVersion {
    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Missing => None,
            Self::Installed(version) => Some(version),
        }
    }
}

impl From<Option<String>> for LocalVersion {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Missing, Self::Installed)
    }
}

/// Reads and writes the version marker file.
#[derive(Debug, Clone)]
pub struct VersionStore {
    marker_path: PathBuf,
}

impl VersionStore {
    /// Store for `<install_dir>/<marker_file>`.
    pub fn new(install_dir: &Path, marker_file: &str) -> Self {
        Self {
            marker_path: install_dir.join(marker_file),
        }
    }

    pub fn marker_path(&self) -> &Path {
        &self.marker_path
    }

    /// Installed version key, or `None` when the marker is absent, unreadable
    /// or empty.
    ///
    /// Only the first line counts; a trailing `\r` from an edited file is
    /// ignored.
    pub fn read(&self) -> Option<String> {
        let content = match std::fs::read_to_string(&self.marker_path) {
            Ok(content) => content,
            Err(e) => {
                debug!("No usable version marker at {}: {e}", self.marker_path.display());
                return None;
            }
        };

        let value = content.lines().next().unwrap_or("").trim_end_matches('\r');
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }

    /// [`read`](Self::read) as a [`LocalVersion`].
    pub fn local_version(&self) -> LocalVersion {
        self.read().into()
    }

    /// Record `value` as the installed version.
    ///
    /// The file is replaced atomically and holds exactly `"<value>\n"`.
    pub fn write(&self, value: &str) -> io::Result<()> {
        atomic_write(&self.marker_path, format!("{value}\n").as_bytes())?;
        debug!("Recorded version {value} in {}", self.marker_path.display());
        Ok(())
    }
}

/// Asks the installed application which commits it was built from.
pub trait VersionIntrospector: Send + Sync {
    /// Commit of the installed main application.
    fn installed_main_version(&self, install_dir: &Path) -> Option<String>;

    /// Commit of the card resources the installed data pack was built from.
    fn installed_content_version(&self, install_dir: &Path) -> Option<String>;
}

/// Introspector for installs that cannot report their version.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIntrospection;

impl VersionIntrospector for NoIntrospection {
    fn installed_main_version(&self, _install_dir: &Path) -> Option<String> {
        None
    }

    fn installed_content_version(&self, _install_dir: &Path) -> Option<String> {
        None
    }
}
