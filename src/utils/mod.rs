//! Supporting utilities: file system helpers and console progress indicators.

pub mod fs;
pub mod progress;

pub use fs::{atomic_write, ensure_dir, file_size};
pub use progress::{ProgressBar, ProgressStyle};
