//! bang-launcher - self-updating launcher for Bang!
//!
//! On every start the launcher asks GitHub for the latest release of the game,
//! compares it with the version recorded in the install directory, downloads
//! and extracts the release archive when they differ, and then starts the
//! client or the dedicated server.
//!
//! # Pipeline
//!
//! ```text
//! release feed ──> ReleaseInfo ──┐
//!                                ├─> UpdatePlan ──> download ──> install ──> marker ──> launch
//! version marker ─> LocalState ──┘
//! ```
//!
//! An interrupted or failed update never records the new version, so the
//! next start simply tries again. Files whose size already matches the
//! archive are not rewritten.
//!
//! # Modules
//!
//! - [`transport`] - HTTP GET into memory with progress and cancellation
//! - [`release`] - resolving the latest release from the GitHub API
//! - [`version`] - the version marker and version introspection
//! - [`update`] - deciding what needs to be downloaded
//! - [`installer`] - ZIP extraction and data pack installation
//! - [`launch`] - starting the installed client or server
//! - [`launcher`] - the orchestrating pipeline and its background worker
//! - [`config`] - `launcher.toml`
//! - [`core`] - error types and user-facing error display
//! - [`cli`] - command line and console output
//! - [`utils`] - file system helpers and progress bars
//!
//! # Configuration
//!
//! Everything works without a configuration file. `launcher.toml` next to the
//! executable (or the file named by `--config` / `BANG_LAUNCHER_CONFIG`) can
//! override the release feed, install layout, launch method and network
//! settings:
//!
//! ```toml
//! [feed]
//! owner = "salvoilmiosi"
//! repo = "bang-sdl"
//! track_commit = true
//!
//! [data_pack]
//! enabled = true
//!
//! [install]
//! launch_on_update_failure = true
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod installer;
pub mod launch;
pub mod launcher;
pub mod release;
pub mod transport;
pub mod update;
pub mod utils;
pub mod version;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
