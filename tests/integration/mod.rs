//! Integration test suite for the launcher
//!
//! These tests talk to a local `wiremock` server standing in for the GitHub
//! API and release CDN, and drive the compiled binary with `assert_cmd`.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **transport**: `HttpTransport` against real HTTP responses
//! - **pipeline**: the full update-and-launch pipeline over HTTP
//! - **cli**: the `bang-launcher` binary end to end

mod cli;
mod pipeline;
mod transport;

use bang_launcher::config::LauncherConfig;
use wiremock::MockServer;

/// Configuration pointing the release feed at `server`.
pub fn config_for(server: &MockServer) -> LauncherConfig {
    let mut config = LauncherConfig::default();
    config.feed.api_base = server.uri();
    config.network.connect_timeout_secs = 5;
    config.network.read_timeout_secs = 5;
    config
}

pub const LATEST_PATH: &str = "/repos/salvoilmiosi/bang-sdl/releases/latest";
