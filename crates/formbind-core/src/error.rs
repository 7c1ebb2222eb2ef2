//! Error types for the Formbind core library
//!
//! This module defines the error handling system for Formbind, using
//! thiserror for ergonomic error definitions and anyhow for flexible
//! error contexts.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Main error type for Formbind operations
#[derive(Error, Debug)]
pub enum Error {
    /// Annotation errors: malformed wire shape, invalid binding paths
    #[error("Annotation error: {message}")]
    Annotation {
        message: String,
        field: Option<String>,
    },

    /// Document failed to load (corrupt bytes, unreadable structure).
    /// Structural: aborts the whole render.
    #[error("Document load failed: {message}")]
    DocumentLoad {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// Document mutation or serialization errors
    #[error("Document error: {message}")]
    Document {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Severity levels for render diagnostics
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no action required
    Info,
    /// Warning, should be reviewed
    Warning,
    /// Error, the field was not placed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}

impl Error {
    /// Create an annotation error scoped to a field id
    pub fn annotation_field(field_id: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Annotation {
            message: message.into(),
            field: Some(field_id.into()),
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        Error::Document {
            message: err.to_string(),
            source: Some(anyhow::Error::new(err)),
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Annotation {
            message: "duplicate field id".to_string(),
            field: Some("line1".to_string()),
        };
        assert_eq!(err.to_string(), "Annotation error: duplicate field id");
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Info < Severity::Warning);
        assert!(Severity::Warning < Severity::Error);
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(err.to_string().contains("gone"));
    }
}
