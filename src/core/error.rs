//! Error handling for the launcher
//!
//! The error system follows two principles:
//! 1. **Strongly-typed errors** so the orchestrator can decide what a failure
//!    means for the run (abort before mutation, skip launch, report only)
//! 2. **User-friendly messages** with an actionable suggestion for each
//!    failure class when printed by the CLI
//!
//! # Taxonomy
//!
//! - [`TransportError`] - failures of a single HTTP GET
//! - [`InstallError`] - failures while writing the archive or data pack to disk
//! - [`LauncherError`] - everything a run can end with, wrapping the two above
//!
//! Resolution and transport errors are raised before anything on disk is
//! touched. Install errors may leave a partially extracted tree behind, but the
//! version marker is only written after a complete extraction, so the next run
//! retries.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bang_launcher::core::{LauncherError, ErrorContext};
//!
//! let error = LauncherError::NoReleaseFound {
//!     reason: "release has no assets".to_string(),
//! };
//! ErrorContext::new(error)
//!     .with_suggestion("Try again once the release has finished publishing")
//!     .display();
//! ```

use colored::Colorize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single transport request.
#[derive(Error, Debug)]
pub enum TransportError {
    /// The HTTP client could not be constructed (TLS backend, proxy settings).
    #[error("Failed to initialise the HTTP client")]
    Init {
        #[source]
        source: reqwest::Error,
    },

    /// The request never produced a response (DNS, connect, TLS handshake).
    #[error("Request to {url} failed")]
    Request {
        /// URL that was requested
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-success status code.
    #[error("{url} responded with HTTP status {status}")]
    Status {
        /// URL that was requested
        url: String,
        /// The HTTP status code
        status: u16,
    },

    /// The connection failed while the body was being streamed.
    #[error("Connection failed while downloading {url}")]
    Read {
        /// URL that was being read
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download cancelled")]
    Cancelled,
}

/// Failure while writing downloaded content into the install directory.
#[derive(Error, Debug)]
pub enum InstallError {
    /// The downloaded bytes are not a readable archive.
    #[error("Failed to open the downloaded archive")]
    ArchiveOpenFailed {
        #[source]
        source: zip::result::ZipError,
    },

    /// A single archive entry could not be read from the central directory.
    #[error("Failed to read entry #{index} of the downloaded archive")]
    EntryUnreadable {
        /// Position of the entry in archive order
        index: usize,
        #[source]
        source: zip::result::ZipError,
    },

    /// A destination file or directory could not be opened for writing.
    ///
    /// Typically the application is still running and holds the file open.
    #[error("Cannot write to {}", path.display())]
    PathUnwritable {
        /// Destination that could not be opened
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Reading or writing failed after the destination was opened.
    #[error("Failed to extract '{entry}' to {}", path.display())]
    Io {
        /// Archive entry name
        entry: String,
        /// Destination path
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The entry decompressed to fewer bytes than its header declares.
    #[error("Archive entry '{entry}' ended after {actual} of {expected} bytes")]
    Truncated {
        /// Archive entry name
        entry: String,
        /// Declared uncompressed size
        expected: u64,
        /// Bytes actually produced
        actual: u64,
    },

    #[error("Installation cancelled")]
    Cancelled,
}

/// Every way a launcher run can fail.
///
/// Variant names follow the launcher's failure taxonomy so the CLI can map each
/// one to a message and a suggestion.
#[derive(Error, Debug)]
pub enum LauncherError {
    /// The transport could not even be set up.
    #[error("Cannot initialise the network client")]
    TransportInitFailed {
        #[source]
        source: TransportError,
    },

    /// Network failure, DNS failure or non-success status.
    #[error("Cannot reach the release server")]
    TransportError {
        #[source]
        source: TransportError,
    },

    /// The response body was not JSON at all.
    #[error("Cannot read the response from {url} as JSON")]
    MalformedResponse {
        /// URL whose body failed to parse
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Valid JSON that lacks the expected release structure.
    #[error("No release found: {reason}")]
    NoReleaseFound {
        /// Which expectation was not met
        reason: String,
    },

    #[error(transparent)]
    Install(#[from] InstallError),

    /// The installed application could not be started.
    #[error("Cannot launch {}: {reason}", path.display())]
    LaunchFailed {
        /// Binary or library that was launched
        path: PathBuf,
        /// Description of the failure
        reason: String,
    },

    /// The configuration is inconsistent.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the problem
        message: String,
    },

    /// A filesystem operation outside archive extraction failed.
    #[error("Cannot access {}", path.display())]
    Io {
        /// Path that was being accessed
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A background task panicked or was aborted.
    #[error("Background task failed: {message}")]
    Worker {
        /// Description from the join error
        message: String,
    },

    #[error("Update cancelled")]
    Cancelled,
}

impl From<TransportError> for LauncherError {
    fn from(error: TransportError) -> Self {
        match error {
            TransportError::Init { .. } => Self::TransportInitFailed { source: error },
            TransportError::Cancelled => Self::Cancelled,
            other => Self::TransportError { source: other },
        }
    }
}

impl LauncherError {
    /// Convenience constructor for structural release-feed failures.
    pub fn no_release(reason: impl Into<String>) -> Self {
        Self::NoReleaseFound { reason: reason.into() }
    }

    /// Whether this error happened outside an install step.
    ///
    /// Install errors may have overwritten some files. Other errors leave the
    /// directory as the last completed step left it, which includes a data
    /// pack installed earlier in the same run.
    pub fn is_before_install(&self) -> bool {
        !matches!(self, Self::Install(_) | Self::LaunchFailed { .. })
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled | Self::Install(InstallError::Cancelled))
    }
}

/// Error wrapper with an optional suggestion and details for CLI display.
///
/// # Examples
///
/// ```rust,no_run
/// use bang_launcher::core::{ErrorContext, LauncherError};
///
/// let context = ErrorContext::new(LauncherError::Cancelled)
///     .with_details("Ctrl+C was pressed during the download");
/// eprintln!("{context}");
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: LauncherError,
    /// What the user can do about it
    pub suggestion: Option<String>,
    /// Additional information, usually the error's source chain
    pub details: Option<String>,
}

impl ErrorContext {
    pub fn new(error: LauncherError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Print the error to stderr with colors.
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Join the `source()` chain of an error into one line.
fn source_chain(error: &(dyn std::error::Error + 'static)) -> Option<String> {
    let mut parts = Vec::new();
    let mut current = error.source();
    while let Some(source) = current {
        parts.push(source.to_string());
        current = source.source();
    }
    (!parts.is_empty()).then(|| parts.join(": "))
}

/// Attach a suggestion and the source chain to a launcher error.
///
/// Each taxonomy code gets its own hint; the source chain (for example the
/// underlying `reqwest` or I/O error) becomes the details line.
pub fn launcher_error_context(error: LauncherError) -> ErrorContext {
    let details = source_chain(&error);
    let suggestion = match &error {
        LauncherError::TransportInitFailed { .. } => {
            Some("Check the proxy and TLS settings of this machine")
        }
        LauncherError::TransportError { .. } => {
            Some("Check your internet connection, then start the launcher again")
        }
        LauncherError::MalformedResponse { .. } => {
            Some("The release server sent an unexpected answer; try again later")
        }
        LauncherError::NoReleaseFound { .. } => {
            Some("No downloadable release is published yet; try again later")
        }
        LauncherError::Install(InstallError::PathUnwritable { .. }) => {
            Some("Close the game if it is running and check the folder permissions")
        }
        LauncherError::Install(InstallError::ArchiveOpenFailed { .. })
        | LauncherError::Install(InstallError::Truncated { .. }) => {
            Some("The download looks corrupted; start the launcher again to retry")
        }
        LauncherError::Install(_) => {
            Some("Start the launcher again; files that are already up to date are skipped")
        }
        LauncherError::LaunchFailed { .. } => {
            Some("Start the launcher again to repair the installation")
        }
        LauncherError::Config { .. } => Some("Fix launcher.toml or remove it to use the defaults"),
        LauncherError::Io { .. } => Some("Check that the install folder exists and is writable"),
        LauncherError::Worker { .. } | LauncherError::Cancelled => None,
    };

    let mut context = ErrorContext::new(error);
    if let Some(suggestion) = suggestion {
        context = context.with_suggestion(suggestion);
    }
    if let Some(details) = details {
        context = context.with_details(details);
    }
    context
}

/// Convert any error into a user-friendly format.
///
/// Launcher errors keep their specific suggestion; anything else (typically a
/// configuration or I/O problem raised through `anyhow`) is shown with its
/// context chain.
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    match error.downcast::<LauncherError>() {
        Ok(launcher_error) => launcher_error_context(launcher_error),
        Err(error) => {
            let details = error.chain().skip(1).map(ToString::to_string).collect::<Vec<_>>();
            let mut context = ErrorContext::new(LauncherError::Config {
                message: error.to_string(),
            });
            if !details.is_empty() {
                context = context.with_details(details.join(": "));
            }
            context
        }
    }
}
