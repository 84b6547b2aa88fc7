//! Core types shared by every stage of the launcher pipeline.
//!
//! At the moment this is the error taxonomy; see [`error`] for how failures are
//! classified and presented to the user.

pub mod error;

pub use error::{
    ErrorContext, InstallError, LauncherError, TransportError, launcher_error_context,
    user_friendly_error,
};
