//! File system helpers used by the installer and the version store.
//!
//! These return [`std::io::Result`] so callers can attach the failing path to
//! their own typed errors.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Create a directory and all of its parents if it does not exist yet.
///
/// Fails if the path exists but is not a directory.
pub fn ensure_dir(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)
    } else if !path.is_dir() {
        Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("Path exists but is not a directory: {}", path.display()),
        ))
    } else {
        Ok(())
    }
}

/// Write `content` to `path` through a temporary file in the same directory.
///
/// The temporary file is synced and then renamed over the destination, so
/// readers see either the old or the new content, never a partial write.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    ensure_dir(parent)?;

    let mut temp = tempfile::NamedTempFile::new_in(parent)?;
    temp.write_all(content)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Size of a regular file, or `None` if it does not exist or is not a file.
pub fn file_size(path: &Path) -> Option<u64> {
    fs::metadata(path).ok().filter(|metadata| metadata.is_file()).map(|metadata| metadata.len())
}

/// Directory containing the running executable.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Failed to locate the launcher executable")?;
    exe.parent()
        .map(Path::to_path_buf)
        .with_context(|| format!("Executable path has no parent: {}", exe.display()))
}
