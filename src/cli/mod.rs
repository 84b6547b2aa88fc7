//! Command-line interface for the launcher.
//!
//! ```text
//! bang-launcher [MODE] [--install-dir DIR] [--config FILE] [--check] [--offline]
//!               [--no-progress] [-v|--verbose] [-q|--quiet]
//! ```
//!
//! `MODE` picks what to start once the install is up to date: `server` for the
//! dedicated server, anything else (or nothing) for the client.
//!
//! The process always exits with status 0. Failures are printed to stderr
//! with a suggestion; a broken update must never leave a desktop shortcut
//! looking like it crashed.
//!
//! # Logging
//!
//! `RUST_LOG` takes precedence. Otherwise `--verbose` enables debug output for
//! the launcher, `--quiet` limits output to errors, and the default shows
//! warnings. Progress and status lines are printed separately by the
//! [`console`] renderer.

pub mod console;


pub use console::{ConsoleRenderer, report_outcome};

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use crate::config::LauncherConfig;
use crate::core::LauncherError;
use crate::launch::{LaunchMode, build_app_launcher, build_introspector};
use crate::launcher::{LaunchOutcome, Launcher, RunOptions, spawn_pipeline};
use crate::transport::HttpTransport;
use crate::utils::progress::is_progress_disabled;

/// Settings derived from the global flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is not set.
    pub log_level: String,
    /// Render progress bars.
    pub show_progress: bool,
    /// Suppress status lines.
    pub quiet: bool,
}

/// Self-updating launcher for Bang!
#[derive(Parser, Debug)]
#[command(
    name = "bang-launcher",
    about = "Keeps Bang! up to date and starts it",
    version,
    author,
    long_about = "Checks GitHub for the latest Bang! release, installs it next to the launcher \
                  when the local copy is out of date, then starts the game."
)]
pub struct Cli {
    /// What to start: `server` for the dedicated server, anything else for the client.
    #[arg(value_name = "MODE")]
    mode: Option<String>,

    /// Anything after the mode is accepted and ignored.
    #[arg(value_name = "ARGS", hide = true)]
    ignored: Vec<String>,

    /// Install directory (defaults to the directory of the launcher executable).
    #[arg(long, value_name = "DIR")]
    install_dir: Option<PathBuf>,

    /// Configuration file (defaults to $BANG_LAUNCHER_CONFIG, then launcher.toml
    /// next to the executable).
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Only check whether an update is available; download and start nothing.
    #[arg(long, conflicts_with = "offline")]
    check: bool,

    /// Start the installed version without contacting the release server.
    #[arg(long)]
    offline: bool,

    /// Disable progress bars.
    #[arg(long)]
    no_progress: bool,

    /// Enable debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only print errors.
    #[arg(short, long)]
    quiet: bool,
}

impl Cli {
    #[must_use]
    pub fn build_config(&self) -> CliConfig {
        let log_level = if self.verbose {
            "bang_launcher=debug"
        } else if self.quiet {
            "error"
        } else {
            "warn"
        };

        CliConfig {
            log_level: log_level.to_string(),
            show_progress: !self.no_progress && !self.quiet && !is_progress_disabled(),
            quiet: self.quiet,
        }
    }

    pub fn run_options(&self) -> RunOptions {
        RunOptions {
            mode: LaunchMode::from_arg(self.mode.as_deref()),
            check_only: self.check,
            skip_update: self.offline,
        }
    }

    /// Install the global tracing subscriber, writing to stderr.
    pub fn init_logging(&self, config: &CliConfig) {
        let filter = if std::env::var("RUST_LOG").is_ok() {
            EnvFilter::from_default_env()
        } else {
            EnvFilter::new(&config.log_level)
        };

        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .try_init();
    }

    /// Run the launcher once and return how it ended.
    ///
    /// Errors returned here happen before the pipeline starts (configuration,
    /// HTTP client setup); pipeline failures are part of the outcome.
    pub async fn execute(self, config: CliConfig) -> Result<LaunchOutcome> {
        let launcher_config = LauncherConfig::load(self.config.as_deref()).await?;
        let install_dir = launcher_config.install_dir(self.install_dir.as_deref())?;
        debug!("Install directory: {}", install_dir.display());
        if !self.ignored.is_empty() {
            debug!("Ignoring extra arguments: {}", self.ignored.join(" "));
        }

        let cancel = CancellationToken::new();
        let transport = HttpTransport::new(&launcher_config.network)
            .map_err(LauncherError::from)?
            .with_cancel_token(cancel.clone());
        let introspector = build_introspector(&launcher_config)?;
        let app_launcher = build_app_launcher(&launcher_config)?;
        let options = self.run_options();

        let launcher = Launcher::new(launcher_config, install_dir, transport)
            .with_introspector(introspector)
            .with_app_launcher(app_launcher)
            .with_cancel_token(cancel)
            .with_options(options);

        let mut handle = spawn_pipeline(launcher);
        let mut renderer = ConsoleRenderer::new(config.show_progress, config.quiet);
        let mut listening_for_ctrl_c = true;

        loop {
            tokio::select! {
                event = handle.next_event() => match event {
                    Some(event) => renderer.handle(&event),
                    None => break,
                },
                signal = tokio::signal::ctrl_c(), if listening_for_ctrl_c => {
                    listening_for_ctrl_c = false;
                    if signal.is_ok() {
                        renderer.status("Cancelling...");
                        handle.cancel();
                    }
                }
            }
        }

        renderer.finish();
        Ok(handle.join().await)
    }
}
