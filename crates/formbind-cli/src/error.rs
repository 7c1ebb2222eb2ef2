//! Error types and handling for the CLI
//!
//! This module provides error types and utilities for handling
//! various failure modes in the CLI application.

use colored::Colorize;
use std::io;
use std::path::PathBuf;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for CLI operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// IO error (file operations, etc.)
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error from formbind-core library
    #[error("Core error: {0}")]
    Core(#[from] formbind_core::Error),

    /// File not found
    #[error("File not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{message}")]
    Other { message: String },
}

impl Error {
    /// Create a generic error with a message
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }

    /// Process exit code for this error.
    ///
    /// Per the fill contract, only structural failures reach this
    /// path at all; per-field errors are reported in the output and
    /// exit zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::FileNotFound { .. } | Error::Io(_) => 66,
            _ => 1,
        }
    }

    /// Whether the error suggests re-running with --help
    pub fn should_show_help(&self) -> bool {
        matches!(self, Error::FileNotFound { .. })
    }
}

/// Format an error for terminal display
pub fn format_error(error: &Error, use_color: bool) -> String {
    if use_color {
        format!("{} {}", "error:".red().bold(), error)
    } else {
        format!("error: {error}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_codes() {
        let err = Error::FileNotFound {
            path: PathBuf::from("missing.pdf"),
        };
        assert_eq!(err.exit_code(), 66);
        assert!(err.should_show_help());

        let err = Error::other("boom");
        assert_eq!(err.exit_code(), 1);
        assert!(!err.should_show_help());
    }

    #[test]
    fn test_format_error_plain() {
        let err = Error::other("something failed");
        assert_eq!(format_error(&err, false), "error: something failed");
    }
}
