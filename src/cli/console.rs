//! Console rendering of pipeline events and outcomes.

use colored::Colorize;

use crate::core::launcher_error_context;
use crate::launcher::{Asset, LaunchOutcome, PipelineEvent, PipelineState};
use crate::update::UpdatePlan;
use crate::utils::progress::ProgressBar;

/// Turns [`PipelineEvent`]s into status lines and a download bar.
pub struct ConsoleRenderer {
    show_progress: bool,
    quiet: bool,
    bar: Option<ProgressBar>,
}

impl ConsoleRenderer {
    pub fn new(show_progress: bool, quiet: bool) -> Self {
        Self {
            show_progress,
            quiet,
            bar: None,
        }
    }

    pub fn handle(&mut self, event: &PipelineEvent) {
        match event {
            PipelineEvent::State(PipelineState::Downloading(asset)) => self.start_download(*asset),
            PipelineEvent::State(_) => self.finish(),
            PipelineEvent::Status(line) => self.status(line),
            PipelineEvent::Progress {
                bytes_read,
                bytes_total,
                ..
            } => {
                if let Some(bar) = &self.bar {
                    if let Some(total) = bytes_total {
                        bar.set_length(*total);
                    }
                    bar.set_position(*bytes_read);
                }
            }
        }
    }

    /// Print a status line above the download bar.
    pub fn status(&self, line: &str) {
        if self.quiet {
            return;
        }
        match &self.bar {
            Some(bar) => bar.println(line),
            None => println!("{line}"),
        }
    }

    /// Remove the download bar, if any.
    pub fn finish(&mut self) {
        if let Some(bar) = self.bar.take() {
            bar.finish_and_clear();
        }
    }

    fn start_download(&mut self, asset: Asset) {
        self.finish();
        let bar = if self.show_progress {
            ProgressBar::new_download(None)
        } else {
            ProgressBar::hidden()
        };
        bar.set_message(asset.to_string());
        self.bar = Some(bar);
    }
}

fn describe_plan(plan: &UpdatePlan) -> &'static str {
    match (plan.main, plan.data_pack) {
        (false, false) => "up to date",
        (true, false) => "game update available",
        (false, true) => "card data update available",
        (true, true) => "game and card data updates available",
    }
}

/// Print how the run ended and return the process exit code.
pub fn report_outcome(outcome: LaunchOutcome, quiet: bool) -> i32 {
    let code = outcome.exit_code();

    match outcome {
        LaunchOutcome::Launched {
            update_error,
            version,
            ..
        } => {
            if let Some(error) = update_error {
                launcher_error_context(error).display();
            }
            if !quiet {
                match version {
                    Some(version) => println!("{} version {version}", "Started".green()),
                    None => println!("{}", "Started".green()),
                }
            }
        }
        LaunchOutcome::Checked { plan, remote } => {
            if !quiet {
                println!("Latest release: {} ({})", remote.version_label, describe_plan(&plan));
            }
        }
        LaunchOutcome::LaunchFailed { error, .. } | LaunchOutcome::Failed(error) => {
            launcher_error_context(error).display();
        }
        LaunchOutcome::Cancelled => {
            eprintln!("{}", "Update cancelled".yellow());
        }
    }

    code
}
