//! Test utilities for the launcher
//!
//! Building blocks for exercising the pipeline without a network or a real
//! game install:
//! - [`MockTransport`]: in-memory [`Transport`](crate::transport::Transport)
//!   serving canned bodies per URL and recording every request
//! - [`ZipBuilder`]: release archives built in memory
//! - [`release_json`] / [`tree_json`]: GitHub API response bodies
//! - [`RecordingLauncher`], [`StaticIntrospector`], [`RecordingSink`]: test
//!   doubles for the process boundary and the status channel
//!
//! # Example
//!
//! ```rust,no_run
//! use bang_launcher::test_utils::{MockTransport, ZipBuilder, release_json};
//!
//! let archive = ZipBuilder::new().file("bang-sdl-1.2/bangclient", b"binary").build();
//! let transport = MockTransport::new()
//!     .with_json(
//!         "https://api.github.com/repos/salvoilmiosi/bang-sdl/releases/latest",
//!         &release_json("v1.2", None, &[("https://example.com/bang.zip", archive.len() as u64)]),
//!     )
//!     .with_body("https://example.com/bang.zip", archive);
//! ```

mod archive;
mod fixtures;
mod recording;
mod transport;

pub use archive::ZipBuilder;
pub use fixtures::{release_json, release_list_json, tree_json};
pub use recording::{RecordingLauncher, RecordingSink, StaticIntrospector};
pub use transport::MockTransport;

use std::sync::Once;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Global flag to ensure logging is only initialized once in tests
static INIT_LOGGING: Once = Once::new();

/// Initialize logging for tests.
///
/// Uses the provided level, or `RUST_LOG` when no level is given. Without
/// either, tests run without a subscriber.
///
/// ```bash
/// RUST_LOG=bang_launcher=debug cargo test
/// ```
pub fn init_test_logging(level: Option<Level>) {
    INIT_LOGGING.call_once(|| {
        let filter = if let Some(level) = level {
            EnvFilter::new(level.to_string())
        } else if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            return;
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .with_target(true)
            .with_thread_ids(false)
            .try_init();
    });
}
