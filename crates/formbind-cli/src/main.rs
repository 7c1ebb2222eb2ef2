//! Formbind CLI - annotation-driven PDF form filling
//!
//! This is the main entry point for the Formbind CLI application,
//! providing commands for filling PDFs from annotations, inspecting
//! native form fields, and validating annotation files.

mod cli;
mod error;
mod handlers;
mod logging;
mod output;

use cli::{Cli, Commands};
use colored::control;
use error::Result;
use logging::LoggingConfig;
use output::OutputWriter;
use std::process;

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse_args();

    // Set up colored output
    control::set_override(cli.use_color());

    // Initialize logging
    let logging = LoggingConfig::from_verbosity(cli.verbosity_level());
    if let Err(e) = logging.init(cli.use_color()) {
        eprintln!("Failed to initialize logging: {e}");
    }

    // Run the application
    match run(cli) {
        Ok(()) => process::exit(0),
        Err(e) => {
            eprintln!(
                "{}",
                error::format_error(&e, control::SHOULD_COLORIZE.should_colorize())
            );
            if e.should_show_help() {
                eprintln!("\nFor more information, try '--help'");
            }
            process::exit(e.exit_code());
        }
    }
}

/// Main application logic
fn run(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.output, cli.use_color(), cli.quiet);

    tracing::debug!(command = ?cli.command, "executing command");

    match cli.command {
        Commands::Fill(args) => handlers::handle_fill(args, &output),
        Commands::Fields(args) => handlers::handle_fields(args, &output),
        Commands::Validate(args) => handlers::handle_validate(args, &output),
    }
}
