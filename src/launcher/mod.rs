//! The update-and-launch pipeline.
//!
//! [`Launcher`] is the context object for one run. It owns the configuration,
//! the transport, the version store and the process boundary, and drives the
//! steps strictly in order:
//!
//! ```text
//! Resolving -> Deciding -> Idle ----------------------------> Launching -> Done
//!                       \-> Downloading -> Installing (xN) -/
//! ```
//!
//! A failure while resolving, downloading or installing ends in `Error`
//! without launching; cancellation ends in `Cancelled`. Progress and status
//! lines are published to a [`StatusSink`] as [`PipelineEvent`]s, which is
//! how the foreground learns what the background [`worker`] is doing.

pub mod worker;


pub use worker::{PipelineHandle, spawn_pipeline};

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::mpsc::UnboundedSender;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::LauncherConfig;
use crate::core::{InstallError, LauncherError};
use crate::installer::Installer;
use crate::launch::{AppLauncher, LaunchMode, ProcessLauncher};
use crate::release::{ReleaseInfo, ReleaseResolver};
use crate::transport::{ProgressSink, Transport};
use crate::update::{LocalState, UpdatePlan};
use crate::utils::fs::ensure_dir;
use crate::version::{NoIntrospection, VersionIntrospector, VersionStore};

/// Downloadable asset of a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Asset {
    Main,
    DataPack,
}

impl fmt::Display for Asset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "game"),
            Self::DataPack => write!(f, "card data"),
        }
    }
}

/// Where the pipeline currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Resolving,
    Deciding,
    /// Everything is up to date.
    Idle,
    Downloading(Asset),
    Installing(Asset),
    Launching,
    Done,
    Error,
    Cancelled,
}

/// Message from the pipeline to whoever displays it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineEvent {
    State(PipelineState),
    /// Human-readable status line.
    Status(String),
    Progress {
        asset: Asset,
        bytes_read: u64,
        bytes_total: Option<u64>,
    },
}

/// Receives pipeline events. Implementations must not block.
pub trait StatusSink: Send + Sync {
    fn emit(&self, event: PipelineEvent);
}

impl StatusSink for UnboundedSender<PipelineEvent> {
    fn emit(&self, event: PipelineEvent) {
        // The receiver going away only means nobody is watching anymore
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl StatusSink for NullSink {
    fn emit(&self, _event: PipelineEvent) {}
}

/// Forwards transport progress for one asset to the status sink.
struct AssetProgress<'a> {
    sink: &'a dyn StatusSink,
    asset: Asset,
}

impl ProgressSink for AssetProgress<'_> {
    fn on_progress(&self, bytes_read: u64, bytes_total: Option<u64>) {
        self.sink.emit(PipelineEvent::Progress {
            asset: self.asset,
            bytes_read,
            bytes_total,
        });
    }
}

/// Per-run switches from the command line.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub mode: LaunchMode,
    /// Stop after deciding; never download or launch.
    pub check_only: bool,
    /// Do not contact the release server; launch what is installed.
    pub skip_update: bool,
}

/// How a run ended.
#[derive(Debug)]
pub enum LaunchOutcome {
    /// The application was started.
    Launched {
        plan: UpdatePlan,
        /// Installed version after the run.
        version: Option<String>,
        /// Set when the update failed and the installed version was started anyway.
        update_error: Option<LauncherError>,
    },
    /// `check_only` run: what would have been updated.
    Checked { plan: UpdatePlan, remote: ReleaseInfo },
    /// The update went through but the application did not start.
    LaunchFailed { plan: UpdatePlan, error: LauncherError },
    /// The update failed; nothing was launched.
    Failed(LauncherError),
    Cancelled,
}

impl LaunchOutcome {
    /// Process exit code for this outcome.
    ///
    /// Always 0: failures are reported on stderr, never through the exit
    /// status.
    pub fn exit_code(&self) -> i32 {
        0
    }
}

/// Result of the update part of a run.
enum UpdateStep {
    Ready(UpdatePlan),
    Checked(UpdatePlan, ReleaseInfo),
}

/// One launcher run: update the install directory, then start the game.
pub struct Launcher<T: Transport> {
    config: LauncherConfig,
    install_dir: PathBuf,
    transport: T,
    store: VersionStore,
    introspector: Arc<dyn VersionIntrospector>,
    app_launcher: Arc<dyn AppLauncher>,
    sink: Arc<dyn StatusSink>,
    cancel: CancellationToken,
    options: RunOptions,
    /// Set once this run has written anything into the install directory.
    modified: AtomicBool,
}

impl<T: Transport> Launcher<T> {
    /// Launcher with a process launcher, no introspection and no status sink.
    pub fn new(config: LauncherConfig, install_dir: impl Into<PathBuf>, transport: T) -> Self {
        let install_dir = install_dir.into();
        let store = VersionStore::new(&install_dir, &config.install.marker_file);
        let app_launcher = Arc::new(ProcessLauncher::from_config(&config.launch));

        Self {
            config,
            install_dir,
            transport,
            store,
            introspector: Arc::new(NoIntrospection),
            app_launcher,
            sink: Arc::new(NullSink),
            cancel: CancellationToken::new(),
            options: RunOptions::default(),
            modified: AtomicBool::new(false),
        }
    }

    pub fn with_introspector(mut self, introspector: Arc<dyn VersionIntrospector>) -> Self {
        self.introspector = introspector;
        self
    }

    pub fn with_app_launcher(mut self, app_launcher: Arc<dyn AppLauncher>) -> Self {
        self.app_launcher = app_launcher;
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn StatusSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Share `cancel` with the transport so a cancel also stops downloads.
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_options(mut self, options: RunOptions) -> Self {
        self.options = options;
        self
    }

    pub fn install_dir(&self) -> &Path {
        &self.install_dir
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run the whole pipeline once.
    pub async fn run(&self) -> LaunchOutcome {
        if self.options.skip_update {
            info!("Skipping the update check");
            self.status("Starting without checking for updates");
            return self.launch(UpdatePlan::default(), None).await;
        }

        match self.update().await {
            Ok(UpdateStep::Checked(plan, remote)) => {
                self.state(PipelineState::Done);
                LaunchOutcome::Checked { plan, remote }
            }
            Ok(UpdateStep::Ready(plan)) => self.launch(plan, None).await,
            Err(error) if error.is_cancelled() || self.cancel.is_cancelled() => {
                info!("Update cancelled");
                self.state(PipelineState::Cancelled);
                LaunchOutcome::Cancelled
            }
            Err(error) => {
                warn!("Update failed: {error}");
                self.state(PipelineState::Error);

                if self.can_fall_back(&error) {
                    self.status(format!("Update failed ({error}), starting the installed version"));
                    return self.launch(UpdatePlan::default(), Some(error)).await;
                }
                LaunchOutcome::Failed(error)
            }
        }
    }

    /// Whether the installed version may still be started after `error`.
    ///
    /// Only an untouched previous install qualifies: a data pack replaced
    /// earlier in the run would no longer match the old binary.
    fn can_fall_back(&self, error: &LauncherError) -> bool {
        self.config.install.launch_on_update_failure
            && error.is_before_install()
            && !self.modified.load(Ordering::Acquire)
            && self.store.read().is_some()
    }

    async fn update(&self) -> Result<UpdateStep, LauncherError> {
        self.modified.store(false, Ordering::Release);
        self.state(PipelineState::Resolving);
        self.status("Checking for updates...");
        let remote = ReleaseResolver::new(&self.transport, &self.config).resolve_latest().await?;
        self.check_cancelled()?;

        self.state(PipelineState::Deciding);
        let local = LocalState::inspect(
            &self.install_dir,
            &self.store,
            self.introspector.as_ref(),
            &self.config,
        );
        let plan = UpdatePlan::decide(&remote, &local);
        debug!("Update plan for {}: {plan:?}", remote.version_label);

        if self.options.check_only {
            return Ok(UpdateStep::Checked(plan, remote));
        }

        if plan.is_empty() {
            self.state(PipelineState::Idle);
            self.status(format!("Version {} is up to date", remote.version_label));
            return Ok(UpdateStep::Ready(plan));
        }

        ensure_dir(&self.install_dir).map_err(|source| LauncherError::Io {
            path: self.install_dir.clone(),
            source,
        })?;

        if plan.data_pack {
            if let Some(pack) = &remote.data_pack {
                let bytes = self.download(Asset::DataPack, &pack.url, pack.size).await?;

                self.state(PipelineState::Installing(Asset::DataPack));
                self.status("Installing card data...");
                let installer = self.installer();
                let file = self.config.data_pack.file.clone();
                self.blocking(move || installer.install_data_pack(&bytes, &file)).await?;
                self.modified.store(true, Ordering::Release);
            }
        }

        if plan.main {
            let bytes = self
                .download(Asset::Main, &remote.archive_url, remote.archive_size)
                .await?;

            self.state(PipelineState::Installing(Asset::Main));
            self.status(format!("Installing version {}...", remote.version_label));
            let installer = self.installer();
            let marker = remote.marker_value().to_string();
            let report = self.blocking(move || installer.install_main(&bytes, &marker)).await?;
            self.status(format!(
                "Updated to {} ({} files written, {} unchanged)",
                remote.version_label,
                report.written.len(),
                report.skipped
            ));
        }

        Ok(UpdateStep::Ready(plan))
    }

    async fn download(&self, asset: Asset, url: &str, size: u64) -> Result<Vec<u8>, LauncherError> {
        self.check_cancelled()?;
        self.state(PipelineState::Downloading(asset));
        self.status(format!("Downloading {asset}..."));

        let progress = AssetProgress {
            sink: self.sink.as_ref(),
            asset,
        };
        let bytes = self.transport.fetch(url, Some(size), Some(&progress)).await?;
        debug!("Downloaded {asset}: {} bytes", bytes.len());
        Ok(bytes)
    }

    async fn launch(&self, plan: UpdatePlan, update_error: Option<LauncherError>) -> LaunchOutcome {
        if self.cancel.is_cancelled() {
            self.state(PipelineState::Cancelled);
            return LaunchOutcome::Cancelled;
        }

        let mode = self.options.mode;
        self.state(PipelineState::Launching);
        self.status(format!("Starting the {mode}..."));

        let app_launcher = Arc::clone(&self.app_launcher);
        let install_dir = self.install_dir.clone();
        let result = tokio::task::spawn_blocking(move || app_launcher.launch(&install_dir, mode))
            .await
            .unwrap_or_else(|e| Err(LauncherError::Worker { message: e.to_string() }));

        match result {
            Ok(()) => {
                self.state(PipelineState::Done);
                LaunchOutcome::Launched {
                    plan,
                    version: self.store.read(),
                    update_error,
                }
            }
            Err(error) => {
                warn!("Launch failed: {error}");
                self.state(PipelineState::Error);
                LaunchOutcome::LaunchFailed { plan, error }
            }
        }
    }

    fn installer(&self) -> Installer {
        Installer::new(self.install_dir.clone(), self.store.clone(), self.cancel.clone())
    }

    /// Run a filesystem step on the blocking pool.
    async fn blocking<R, F>(&self, step: F) -> Result<R, LauncherError>
    where
        R: Send + 'static,
        F: FnOnce() -> Result<R, InstallError> + Send + 'static,
    {
        tokio::task::spawn_blocking(step)
            .await
            .map_err(|e| LauncherError::Worker { message: e.to_string() })?
            .map_err(LauncherError::from)
    }

    fn check_cancelled(&self) -> Result<(), LauncherError> {
        if self.cancel.is_cancelled() {
            Err(LauncherError::Cancelled)
        } else {
            Ok(())
        }
    }

    fn state(&self, state: PipelineState) {
        debug!("Pipeline state: {state:?}");
        self.sink.emit(PipelineEvent::State(state));
    }

    fn status(&self, message: impl Into<String>) {
        self.sink.emit(PipelineEvent::Status(message.into()));
    }
}
