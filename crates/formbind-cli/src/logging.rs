//! Logging setup for the Formbind CLI
//!
//! Maps the -v/-q flags to a tracing subscriber with an environment
//! filter; RUST_LOG always wins when set.

use crate::error::Result;
use tracing_subscriber::EnvFilter;

/// Logging configuration derived from CLI verbosity
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level filter directive
    pub level: &'static str,
    /// Include file and line numbers
    pub source_location: bool,
}

impl LoggingConfig {
    /// Create logging config from verbosity level
    pub fn from_verbosity(verbosity: u8) -> Self {
        match verbosity {
            0 => Self {
                level: "error",
                source_location: false,
            },
            1 => Self {
                level: "warn",
                source_location: false,
            },
            2 => Self {
                level: "info",
                source_location: false,
            },
            3 => Self {
                level: "debug",
                source_location: true,
            },
            _ => Self {
                level: "trace",
                source_location: true,
            },
        }
    }

    /// Install the global tracing subscriber
    pub fn init(&self, use_color: bool) -> Result<()> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(use_color)
            .with_file(self.source_location)
            .with_line_number(self.source_location)
            .with_writer(std::io::stderr)
            .init();

        Ok(())
    }
}
