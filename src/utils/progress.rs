//! Progress indicators for the console front end.
//!
//! Wraps `indicatif` with the launcher's styling. Every indicator becomes a
//! hidden no-op when progress output is disabled, so callers never need to
//! branch on it.
//!
//! # Environment Variables
//!
//! - `BANG_LAUNCHER_NO_PROGRESS`: set to any value to disable all progress indicators
//!
//! # Examples
//!
//! ```rust
//! use bang_launcher::utils::progress::ProgressBar;
//!
//! let progress = ProgressBar::new_download(Some(4096));
//! progress.set_message("bang-sdl.zip");
//! progress.set_position(2048);
//! progress.finish_and_clear();
//! ```

use indicatif::{ProgressBar as IndicatifBar, ProgressStyle as IndicatifStyle};
use std::time::Duration;

/// Environment variable that disables progress output.
pub const NO_PROGRESS_ENV_VAR: &str = "BANG_LAUNCHER_NO_PROGRESS";

/// Checks if progress bars should be disabled.
pub fn is_progress_disabled() -> bool {
    std::env::var(NO_PROGRESS_ENV_VAR).is_ok()
}

/// A progress bar with consistent styling.
///
/// Cloning is cheap; clones drive the same bar.
#[derive(Clone)]
pub struct ProgressBar {
    inner: IndicatifBar,
}

impl ProgressBar {
    /// Byte-oriented bar for a download.
    ///
    /// With an unknown total the bar starts as a byte counter and switches to a
    /// proper bar once [`set_length`](Self::set_length) is called.
    pub fn new_download(total: Option<u64>) -> Self {
        if is_progress_disabled() {
            return Self::hidden();
        }

        let bar = match total {
            Some(total) => {
                let bar = IndicatifBar::new(total);
                bar.set_style(ProgressStyle::download());
                bar
            }
            None => {
                let bar = IndicatifBar::new_spinner();
                bar.set_style(ProgressStyle::download_unknown());
                bar.enable_steady_tick(Duration::from_millis(100));
                bar
            }
        };
        Self { inner: bar }
    }

    /// A bar that draws nothing.
    pub fn hidden() -> Self {
        Self {
            inner: IndicatifBar::hidden(),
        }
    }

    pub fn set_message(&self, msg: impl Into<String>) {
        self.inner.set_message(msg.into());
    }

    /// Set or correct the total, switching a byte counter to a bar.
    pub fn set_length(&self, len: u64) {
        if self.inner.length() != Some(len) {
            self.inner.set_style(ProgressStyle::download());
            self.inner.set_length(len);
        }
    }

    pub fn set_position(&self, pos: u64) {
        self.inner.set_position(pos);
    }

    /// Print a line above the bar without tearing it.
    pub fn println(&self, msg: impl AsRef<str>) {
        if self.inner.is_hidden() {
            println!("{}", msg.as_ref());
        } else {
            self.inner.println(msg.as_ref());
        }
    }

    pub fn finish_and_clear(&self) {
        self.inner.finish_and_clear();
    }

    pub fn is_hidden(&self) -> bool {
        self.inner.is_hidden()
    }
}

/// Progress style presets.
pub struct ProgressStyle;

impl ProgressStyle {
    /// Download with known size: bytes, total and ETA.
    pub fn download() -> IndicatifStyle {
        template_or_default(
            IndicatifStyle::default_bar(),
            "{msg:.bold.cyan} [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        )
        .progress_chars("━╸━")
    }

    /// Download whose size is not known yet.
    pub fn download_unknown() -> IndicatifStyle {
        template_or_default(
            IndicatifStyle::default_spinner(),
            "{msg:.bold.cyan} {spinner:.cyan} {bytes} ({bytes_per_sec})",
        )
    }
}

fn template_or_default(base: IndicatifStyle, template: &str) -> IndicatifStyle {
    match base.clone().template(template) {
        Ok(style) => style,
        Err(_) => base,
    }
}
