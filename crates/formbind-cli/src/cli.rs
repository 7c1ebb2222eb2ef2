//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Formbind CLI - annotation-driven PDF form filling
///
/// Fill fixed-layout forms by binding a JSON annotation (field
/// positions, types, data paths) to a nested data document, writing
/// values into native form fields or as overlaid text.
#[derive(Parser, Debug)]
#[command(
    name = "formbind",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (repeat for more verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Output format for results
    #[arg(long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fill a PDF from an annotation and a data document
    Fill(FillArgs),

    /// List a PDF's native interactive fields and their kinds
    Fields(FieldsArgs),

    /// Parse and compile an annotation file, reporting problems
    Validate(ValidateArgs),
}

/// Arguments for the fill command
#[derive(Parser, Debug)]
pub struct FillArgs {
    /// Path to the input PDF
    #[arg(value_name = "INPUT_PDF")]
    pub input: PathBuf,

    /// Path to the annotation JSON
    #[arg(short, long, value_name = "ANNOTATION")]
    pub annotation: PathBuf,

    /// Path to the data document JSON
    #[arg(short, long, value_name = "DATA")]
    pub data: PathBuf,

    /// Path for the filled output PDF
    #[arg(short = 'o', long, value_name = "OUTPUT")]
    pub output_file: PathBuf,

    /// Force coordinate placement even when native fields exist
    #[arg(long)]
    pub no_native: bool,

    /// Omit currency amounts that are exactly zero
    #[arg(long)]
    pub suppress_zero: bool,
}

/// Arguments for the fields command
#[derive(Parser, Debug)]
pub struct FieldsArgs {
    /// Path to the PDF to inspect
    #[arg(value_name = "INPUT_PDF")]
    pub input: PathBuf,
}

/// Arguments for the validate command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to the annotation JSON
    #[arg(value_name = "ANNOTATION")]
    pub annotation: PathBuf,
}

/// Output format options
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output
    Human,
    /// JSON output for scripting
    Json,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Whether colored output should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::env::var_os("NO_COLOR").is_none()
    }

    /// Effective verbosity level (0 = warnings only)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose.saturating_add(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_args_parse() {
        let cli = Cli::try_parse_from([
            "formbind", "fill", "in.pdf", "-a", "ann.json", "-d", "data.json", "-o", "out.pdf",
        ])
        .unwrap();
        match cli.command {
            Commands::Fill(args) => {
                assert_eq!(args.input, PathBuf::from("in.pdf"));
                assert!(!args.no_native);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_output_format_flag_coexists_with_output_file() {
        // `-o` belongs to fill's output file; the format flag is
        // long-only so the two never collide.
        let cli = Cli::try_parse_from([
            "formbind", "--output", "json", "fill", "in.pdf", "-a", "ann.json", "-d",
            "data.json", "-o", "out.pdf",
        ])
        .unwrap();
        assert_eq!(cli.output, OutputFormat::Json);
        match cli.command {
            Commands::Fill(args) => assert_eq!(args.output_file, PathBuf::from("out.pdf")),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        let result = Cli::try_parse_from(["formbind", "-q", "-v", "fields", "in.pdf"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["formbind", "-vv", "fields", "in.pdf"]).unwrap();
        assert_eq!(cli.verbosity_level(), 3);

        let cli = Cli::try_parse_from(["formbind", "-q", "fields", "in.pdf"]).unwrap();
        assert_eq!(cli.verbosity_level(), 0);
    }
}
