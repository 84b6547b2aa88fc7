//! Installing downloaded assets into the install directory.
//!
//! The main archive is a ZIP whose entries all live under one top-level
//! directory (`bang-sdl-1.2/bin/bangclient`). That directory is stripped, so
//! the tree lands directly in the install directory. Files whose size already
//! matches the entry are left alone; this keeps unchanged files (and files the
//! running game holds open) out of the way of an update.
//!
//! The version marker is written only after every entry was extracted. A
//! failed or cancelled install leaves the old marker (or none) behind, so the
//! next run starts over.

use std::fs::File;
use std::io::{Cursor, Read, Write};
use std::path::{Component, Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use zip::ZipArchive;

use crate::core::InstallError;
use crate::utils::fs::{atomic_write, ensure_dir, file_size};
use crate::version::VersionStore;

/// Size of the copy buffer used while extracting an entry.
pub const CHUNK_SIZE: usize = 8 * 1024;

/// What an install did to the install directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallReport {
    /// Files that were (re)written, in archive order.
    pub written: Vec<PathBuf>,
    /// Files left untouched because their size already matched.
    pub skipped: usize,
    /// Directory entries created.
    pub directories: usize,
}

impl InstallReport {
    /// Whether the install left the directory exactly as it was.
    pub fn is_noop(&self) -> bool {
        self.written.is_empty()
    }
}

/// Drop the first path segment of an archive entry name.
///
/// Returns `None` for names without a `/` and for the bare top-level directory
/// (`bang-sdl-1.2/`), which have nothing left to install.
pub fn strip_top_level(name: &str) -> Option<&str> {
    let (_, rest) = name.split_once('/')?;
    if rest.is_empty() { None } else { Some(rest) }
}

/// Turn a stripped entry name into a path below the install directory.
///
/// Names containing `..`, a root or a drive prefix are rejected.
fn install_relative_path(rest: &str) -> Option<PathBuf> {
    let mut path = PathBuf::new();
    for component in Path::new(rest).components() {
        match component {
            Component::Normal(part) => path.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if path.as_os_str().is_empty() { None } else { Some(path) }
}

/// Extract a ZIP archive held in memory into `install_dir`.
///
/// Entries are processed in archive order; a later entry mapping to the same
/// path overwrites an earlier one. The first file that cannot be opened for
/// writing aborts the whole install with [`InstallError::PathUnwritable`].
pub fn install_archive(
    bytes: &[u8],
    install_dir: &Path,
    cancel: &CancellationToken,
) -> Result<InstallReport, InstallError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|source| InstallError::ArchiveOpenFailed { source })?;

    ensure_dir(install_dir).map_err(|source| InstallError::PathUnwritable {
        path: install_dir.to_path_buf(),
        source,
    })?;

    let mut report = InstallReport::default();

    for index in 0..archive.len() {
        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }

        let mut entry = archive
            .by_index(index)
            .map_err(|source| InstallError::EntryUnreadable { index, source })?;
        let name = entry.name().to_string();

        let Some(rest) = strip_top_level(&name) else {
            debug!("Skipping top-level entry '{name}'");
            continue;
        };
        let Some(relative) = install_relative_path(rest) else {
            warn!("Skipping archive entry with unsafe path '{name}'");
            continue;
        };
        let destination = install_dir.join(&relative);

        if entry.is_dir() || rest.ends_with('/') {
            ensure_dir(&destination).map_err(|source| InstallError::PathUnwritable {
                path: destination.clone(),
                source,
            })?;
            report.directories += 1;
            continue;
        }

        let declared = entry.size();
        if file_size(&destination) == Some(declared) {
            debug!("Unchanged: {}", relative.display());
            report.skipped += 1;
            continue;
        }

        if let Some(parent) = destination.parent() {
            ensure_dir(parent).map_err(|source| InstallError::PathUnwritable {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mode = entry.unix_mode();
        copy_entry(&mut entry, &name, &destination, declared, cancel)?;
        apply_permissions(&name, &destination, mode)?;

        debug!("Extracted {} ({declared} bytes)", relative.display());
        report.written.push(destination);
    }

    info!(
        "Installed {} files ({} unchanged) into {}",
        report.written.len(),
        report.skipped,
        install_dir.display()
    );
    Ok(report)
}

/// Stream exactly `declared` bytes from `reader` into `destination`.
fn copy_entry(
    reader: &mut impl Read,
    entry: &str,
    destination: &Path,
    declared: u64,
    cancel: &CancellationToken,
) -> Result<(), InstallError> {
    let io_error = |source| InstallError::Io {
        entry: entry.to_string(),
        path: destination.to_path_buf(),
        source,
    };

    let mut file = File::create(destination).map_err(|source| InstallError::PathUnwritable {
        path: destination.to_path_buf(),
        source,
    })?;

    let mut buffer = [0u8; CHUNK_SIZE];
    let mut remaining = declared;
    while remaining > 0 {
        if cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }

        let want = usize::try_from(remaining).map_or(CHUNK_SIZE, |left| left.min(CHUNK_SIZE));
        let read = reader.read(&mut buffer[..want]).map_err(io_error)?;
        if read == 0 {
            return Err(InstallError::Truncated {
                entry: entry.to_string(),
                expected: declared,
                actual: declared - remaining,
            });
        }

        file.write_all(&buffer[..read]).map_err(io_error)?;
        remaining -= read as u64;
    }

    file.flush().map_err(io_error)
}

#[cfg(unix)]
fn apply_permissions(entry: &str, destination: &Path, mode: Option<u32>) -> Result<(), InstallError> {
    use std::os::unix::fs::PermissionsExt;

    let Some(mode) = mode else {
        return Ok(());
    };
    std::fs::set_permissions(destination, std::fs::Permissions::from_mode(mode & 0o777)).map_err(
        |source| InstallError::Io {
            entry: entry.to_string(),
            path: destination.to_path_buf(),
            source,
        },
    )
}

#[cfg(not(unix))]
fn apply_permissions(
    _entry: &str,
    _destination: &Path,
    _mode: Option<u32>,
) -> Result<(), InstallError> {
    Ok(())
}

/// Installs assets into one install directory and commits the marker.
#[derive(Debug, Clone)]
pub struct Installer {
    install_dir: PathBuf,
    store: VersionStore,
    cancel: CancellationToken,
}

impl Installer {
    pub fn new(install_dir: impl Into<PathBuf>, store: VersionStore, cancel: CancellationToken) -> Self {
        Self {
            install_dir: install_dir.into(),
            store,
            cancel,
        }
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    /// Extract the main archive, then record `marker_value`.
    ///
    /// The marker is untouched unless every entry was extracted.
    pub fn install_main(&self, bytes: &[u8], marker_value: &str) -> Result<InstallReport, InstallError> {
        let report = install_archive(bytes, &self.install_dir, &self.cancel)?;

        if self.cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }
        self.store.write(marker_value).map_err(|source| InstallError::PathUnwritable {
            path: self.store.marker_path().to_path_buf(),
            source,
        })?;

        Ok(report)
    }

    /// Replace the data pack file with `bytes`.
    ///
    /// The file is written atomically; its version is reported by the
    /// installed application, so no marker is written.
    pub fn install_data_pack(&self, bytes: &[u8], file: &str) -> Result<PathBuf, InstallError> {
        if self.cancel.is_cancelled() {
            return Err(InstallError::Cancelled);
        }

        let path = self.install_dir.join(file);
        atomic_write(&path, bytes).map_err(|source| InstallError::PathUnwritable {
            path: path.clone(),
            source,
        })?;

        info!("Installed data pack {} ({} bytes)", path.display(), bytes.len());
        Ok(path)
    }
}

#[cfg(test)]
mod tests;
