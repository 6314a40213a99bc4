//! Error types for the EverLink monitor
//!
//! Uses `thiserror` for ergonomic error handling with automatic `Display` and
//! `Error` trait implementations.

use thiserror::Error;

/// The primary error type for monitor operations.
#[derive(Error, Debug)]
pub enum MonitorError {
    /// Configuration-related errors (missing token, unparseable ids, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Discord gateway/REST failures surfaced by serenity
    #[error("Discord error: {0}")]
    Discord(#[from] serenity::Error),

    /// The status artifact no longer exists (deleted out-of-band).
    ///
    /// This is an expected condition, not a failure: the publisher reacts by
    /// recreating the artifact instead of logging an error.
    #[error("Status artifact not found")]
    ArtifactNotFound,

    /// Standard I/O errors (health server bind, etc.)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for monitor operations.
pub type Result<T> = std::result::Result<T, MonitorError>;
