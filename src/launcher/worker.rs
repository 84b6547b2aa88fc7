//! Running the pipeline on a background task.
//!
//! The foreground only reads: it drains [`PipelineEvent`]s from the channel to
//! render status and progress, and may cancel. Events flow one way, from the
//! pipeline to the foreground.

use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::{LaunchOutcome, Launcher, PipelineEvent};
use crate::core::LauncherError;
use crate::transport::Transport;

/// Foreground side of a pipeline running in the background.
pub struct PipelineHandle {
    events: UnboundedReceiver<PipelineEvent>,
    cancel: CancellationToken,
    task: JoinHandle<LaunchOutcome>,
}

/// Start `launcher` on a tokio task.
///
/// The launcher's status sink is replaced by the handle's event channel.
pub fn spawn_pipeline<T: Transport + 'static>(launcher: Launcher<T>) -> PipelineHandle {
    let (sender, events) = mpsc::unbounded_channel();
    let cancel = launcher.cancel_token();
    let launcher = launcher.with_sink(Arc::new(sender));

    let task = tokio::spawn(async move { launcher.run().await });

    PipelineHandle { events, cancel, task }
}

impl PipelineHandle {
    /// Next event, or `None` once the pipeline has finished and the channel
    /// is drained.
    pub async fn next_event(&mut self) -> Option<PipelineEvent> {
        self.events.recv().await
    }

    /// Ask the pipeline to stop at the next chunk or entry boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the pipeline to finish.
    pub async fn join(self) -> LaunchOutcome {
        match self.task.await {
            Ok(outcome) => outcome,
            Err(e) => LaunchOutcome::Failed(LauncherError::Worker { message: e.to_string() }),
        }
    }
}
