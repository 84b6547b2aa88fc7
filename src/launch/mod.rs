//! Starting the installed application.
//!
//! [`AppLauncher`] is the process boundary. [`ProcessLauncher`] spawns the
//! client or server executable and returns immediately; with the `dylib`
//! feature [`LibraryLauncher`] loads the game library and calls its entry
//! point in-process.

#[cfg(feature = "dylib")]
mod library;

#[cfg(feature = "dylib")]
pub use library::LibraryLauncher;

use std::fmt;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::Arc;
use tracing::info;

use crate::config::{LaunchConfig, LaunchMethod, LauncherConfig, VersionSource};
use crate::core::LauncherError;
use crate::version::{NoIntrospection, VersionIntrospector};

/// Which side of the game to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LaunchMode {
    #[default]
    Client,
    Server,
}

impl LaunchMode {
    /// `"server"` selects the server; anything else, or nothing, the client.
    pub fn from_arg(arg: Option<&str>) -> Self {
        match arg {
            Some("server") => Self::Server,
            _ => Self::Client,
        }
    }
}

impl fmt::Display for LaunchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Client => write!(f, "client"),
            Self::Server => write!(f, "server"),
        }
    }
}

/// Starts the installed application.
pub trait AppLauncher: Send + Sync {
    fn launch(&self, install_dir: &Path, mode: LaunchMode) -> Result<(), LauncherError>;
}

/// Spawns `<install_dir>/<binary>` without arguments and does not wait for it.
#[derive(Debug, Clone)]
pub struct ProcessLauncher {
    client_binary: String,
    server_binary: String,
}

impl ProcessLauncher {
    pub fn from_config(config: &LaunchConfig) -> Self {
        Self {
            client_binary: config.client_binary.clone(),
            server_binary: config.server_binary.clone(),
        }
    }

    /// Executable path for `mode`, including the platform suffix.
    pub fn binary_path(&self, install_dir: &Path, mode: LaunchMode) -> PathBuf {
        let name = match mode {
            LaunchMode::Client => &self.client_binary,
            LaunchMode::Server => &self.server_binary,
        };
        install_dir.join(format!("{name}{}", std::env::consts::EXE_SUFFIX))
    }
}

impl AppLauncher for ProcessLauncher {
    fn launch(&self, install_dir: &Path, mode: LaunchMode) -> Result<(), LauncherError> {
        let path = self.binary_path(install_dir, mode);
        if !path.is_file() {
            return Err(LauncherError::LaunchFailed {
                path,
                reason: "executable not found".to_string(),
            });
        }

        let child = Command::new(&path)
            .current_dir(install_dir)
            .stdin(Stdio::null())
            .spawn()
            .map_err(|e| LauncherError::LaunchFailed {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        info!("Started {} (pid {})", path.display(), child.id());
        Ok(())
    }
}

/// Build the launcher selected by `[launch] method`.
pub fn build_app_launcher(config: &LauncherConfig) -> Result<Arc<dyn AppLauncher>, LauncherError> {
    match config.launch.method {
        LaunchMethod::Process => Ok(Arc::new(ProcessLauncher::from_config(&config.launch))),
        #[cfg(feature = "dylib")]
        LaunchMethod::Library => Ok(Arc::new(LibraryLauncher::from_config(&config.launch))),
        #[cfg(not(feature = "dylib"))]
        LaunchMethod::Library => Err(LauncherError::Config {
            message: "[launch] method = \"library\" needs a launcher built with the dylib feature"
                .to_string(),
        }),
    }
}

/// Build the introspector matching the configured version sources.
///
/// Introspection is only wired up when something asks for it: the
/// introspection version source or the data pack.
pub fn build_introspector(
    config: &LauncherConfig,
) -> Result<Arc<dyn VersionIntrospector>, LauncherError> {
    let wanted =
        config.version.source == VersionSource::Introspection || config.data_pack.enabled;
    if !wanted {
        return Ok(Arc::new(NoIntrospection));
    }

    #[cfg(feature = "dylib")]
    {
        Ok(Arc::new(crate::version::LibraryIntrospector::from_config(&config.launch)))
    }
    #[cfg(not(feature = "dylib"))]
    {
        Err(LauncherError::Config {
            message: "version introspection needs a launcher built with the dylib feature"
                .to_string(),
        })
    }
}
