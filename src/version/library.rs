use libloading::{Library, Symbol};
use std::ffi::{CStr, c_char};
use std::path::{Path, PathBuf};
use tracing::debug;

use super::VersionIntrospector;
use crate::config::LaunchConfig;

type VersionFn = unsafe extern "C" fn() -> *const c_char;

/// Reads version commits exported by the installed shared library.
///
/// The library must export `extern "C" fn() -> *const c_char` accessors
/// returning static NUL-terminated strings. Every query loads the library,
/// copies the string and unloads it again, so an update can replace the file
/// right after.
#[derive(Debug, Clone)]
pub struct LibraryIntrospector {
    library: String,
    version_symbol: String,
    content_version_symbol: String,
}

impl LibraryIntrospector {
    pub fn from_config(config: &LaunchConfig) -> Self {
        Self {
            library: config.library.clone(),
            version_symbol: config.version_symbol.clone(),
            content_version_symbol: config.content_version_symbol.clone(),
        }
    }

    fn library_path(&self, install_dir: &Path) -> PathBuf {
        install_dir.join(libloading::library_filename(&self.library))
    }

    fn query(&self, install_dir: &Path, symbol: &str) -> Option<String> {
        let path = self.library_path(install_dir);
        if !path.is_file() {
            return None;
        }

        // SAFETY: the library is the launcher's own application; loading it
        // runs its initialisers, which is what launching it would do anyway.
        let library = match unsafe { Library::new(&path) } {
            Ok(library) => library,
            Err(e) => {
                debug!("Cannot load {}: {e}", path.display());
                return None;
            }
        };

        // SAFETY: the exported accessor has the `VersionFn` signature and
        // returns a pointer to a static string owned by the library, which is
        // copied before the library is unloaded.
        unsafe {
            let accessor: Symbol<VersionFn> = match library.get(symbol.as_bytes()) {
                Ok(accessor) => accessor,
                Err(e) => {
                    debug!("{} does not export {symbol}: {e}", path.display());
                    return None;
                }
            };
            let raw = accessor();
            if raw.is_null() {
                return None;
            }
            let value = CStr::from_ptr(raw).to_string_lossy().into_owned();
            (!value.is_empty()).then_some(value)
        }
    }
}

impl VersionIntrospector for LibraryIntrospector {
    fn installed_main_version(&self, install_dir: &Path) -> Option<String> {
        self.query(install_dir, &self.version_symbol)
    }

    fn installed_content_version(&self, install_dir: &Path) -> Option<String> {
        self.query(install_dir, &self.content_version_symbol)
    }
}
