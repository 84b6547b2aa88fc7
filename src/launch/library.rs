use libloading::{Library, Symbol};
use std::ffi::c_int;
use std::path::{Path, PathBuf};
use tracing::info;

use super::{AppLauncher, LaunchMode};
use crate::config::LaunchConfig;
use crate::core::LauncherError;

type EntryFn = unsafe extern "C" fn(mode: c_int) -> c_int;

/// Runs the game in-process through its exported entry point.
///
/// The entry point takes `0` for the client and `1` for the server and blocks
/// until the game exits.
#[derive(Debug, Clone)]
pub struct LibraryLauncher {
    library: String,
    entry_symbol: String,
}

impl LibraryLauncher {
    pub fn from_config(config: &LaunchConfig) -> Self {
        Self {
            library: config.library.clone(),
            entry_symbol: config.entry_symbol.clone(),
        }
    }

    pub fn library_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(libloading::library_filename(&self.library))
    }
}

impl AppLauncher for LibraryLauncher {
    fn launch(&self, install_dir: &Path, mode: LaunchMode) -> Result<(), LauncherError> {
        let path = self.library_path(install_dir);
        let failed = |reason: String| LauncherError::LaunchFailed {
            path: path.clone(),
            reason,
        };

        // SAFETY: loading the installed game library runs its initialisers,
        // the same code a process launch would run.
        let library = unsafe { Library::new(&path) }.map_err(|e| failed(e.to_string()))?;

        let code = match mode {
            LaunchMode::Client => 0,
            LaunchMode::Server => 1,
        };

        // SAFETY: the entry point is exported with the `EntryFn` signature and
        // the library stays loaded for the duration of the call.
        let status = unsafe {
            let entry: Symbol<EntryFn> = library
                .get(self.entry_symbol.as_bytes())
                .map_err(|e| failed(e.to_string()))?;
            info!("Entering {} in {}", self.entry_symbol, path.display());
            entry(code)
        };

        if status != 0 {
            return Err(failed(format!("entry point returned {status}")));
        }
        Ok(())
    }
}
