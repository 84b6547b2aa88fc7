use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::core::LauncherError;
use crate::launch::{AppLauncher, LaunchMode};
use crate::launcher::{PipelineEvent, PipelineState, StatusSink};
use crate::version::VersionIntrospector;

/// Records launches instead of starting anything.
///
/// Clones share the same log, so a test can keep one and hand the other to
/// the launcher.
#[derive(Clone, Default)]
pub struct RecordingLauncher {
    launches: Arc<Mutex<Vec<(PathBuf, LaunchMode)>>>,
    fail: bool,
}

impl RecordingLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every launch fails with [`LauncherError::LaunchFailed`].
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn launches(&self) -> Vec<(PathBuf, LaunchMode)> {
        self.launches.lock().unwrap().clone()
    }

    pub fn launch_count(&self) -> usize {
        self.launches.lock().unwrap().len()
    }
}

impl AppLauncher for RecordingLauncher {
    fn launch(&self, install_dir: &Path, mode: LaunchMode) -> Result<(), LauncherError> {
        self.launches.lock().unwrap().push((install_dir.to_path_buf(), mode));
        if self.fail {
            return Err(LauncherError::LaunchFailed {
                path: install_dir.join("bangclient"),
                reason: "executable not found".to_string(),
            });
        }
        Ok(())
    }
}

/// Introspector answering fixed values.
#[derive(Debug, Clone, Default)]
pub struct StaticIntrospector {
    pub main: Option<String>,
    pub content: Option<String>,
}

impl StaticIntrospector {
    pub fn new(main: Option<&str>, content: Option<&str>) -> Self {
        Self {
            main: main.map(str::to_string),
            content: content.map(str::to_string),
        }
    }
}

impl VersionIntrospector for StaticIntrospector {
    fn installed_main_version(&self, _install_dir: &Path) -> Option<String> {
        self.main.clone()
    }

    fn installed_content_version(&self, _install_dir: &Path) -> Option<String> {
        self.content.clone()
    }
}

/// Collects every pipeline event.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<PipelineEvent>>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events.lock().unwrap().clone()
    }

    /// State transitions only, in order.
    pub fn states(&self) -> Vec<PipelineState> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::State(state) => Some(state),
                _ => None,
            })
            .collect()
    }

    /// Progress values reported for downloads, in order.
    pub fn progress(&self) -> Vec<(u64, Option<u64>)> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::Progress {
                    bytes_read,
                    bytes_total,
                    ..
                } => Some((bytes_read, bytes_total)),
                _ => None,
            })
            .collect()
    }
}

impl StatusSink for RecordingSink {
    fn emit(&self, event: PipelineEvent) {
        self.events.lock().unwrap().push(event);
    }
}
