//! Terminal output for command results
//!
//! Human output goes through `colored`; `--output json` emits a
//! machine-readable document on stdout for scripting.

use crate::cli::OutputFormat;
use crate::error::Result;
use colored::Colorize;
use formbind_core::{NativeFieldKind, RenderReport, Severity};
use serde_json::json;

/// Writer for CLI results
pub struct OutputWriter {
    format: OutputFormat,
    use_color: bool,
    quiet: bool,
}

impl OutputWriter {
    pub fn new(format: OutputFormat, use_color: bool, quiet: bool) -> Self {
        Self {
            format,
            use_color,
            quiet,
        }
    }

    /// Print a render report after a fill
    pub fn render_report(&self, report: &RenderReport, output_path: &str) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let doc = json!({
                    "output": output_path,
                    "report": report,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            OutputFormat::Human => {
                if self.quiet {
                    return Ok(());
                }
                let summary = format!(
                    "filled {} field(s), {} fallback, {} error(s), {} skipped",
                    report.filled_count,
                    report.fallback_count,
                    report.error_count,
                    report.skipped_count
                );
                if self.use_color {
                    let status = if report.is_clean() {
                        "ok".green().bold()
                    } else {
                        "partial".yellow().bold()
                    };
                    println!("{status} {summary} -> {output_path}");
                } else {
                    println!("{summary} -> {output_path}");
                }
                for diagnostic in &report.diagnostics {
                    let line = format!(
                        "  [{}] {}: {}",
                        diagnostic.severity, diagnostic.field_id, diagnostic.message
                    );
                    if self.use_color && diagnostic.severity == Severity::Error {
                        eprintln!("{}", line.red());
                    } else {
                        eprintln!("{line}");
                    }
                }
            }
        }
        Ok(())
    }

    /// Print a native field listing
    pub fn field_list(&self, fields: &[(String, NativeFieldKind)]) -> Result<()> {
        match self.format {
            OutputFormat::Json => {
                let doc: Vec<_> = fields
                    .iter()
                    .map(|(name, kind)| json!({"name": name, "kind": kind.to_string()}))
                    .collect();
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            OutputFormat::Human => {
                if fields.is_empty() && !self.quiet {
                    println!("no native fields");
                    return Ok(());
                }
                for (name, kind) in fields {
                    let kind = format!("{:<10}", kind.to_string());
                    if self.use_color {
                        println!("{} {}", kind.cyan(), name);
                    } else {
                        println!("{kind} {name}");
                    }
                }
            }
        }
        Ok(())
    }

    /// Print a plain status message (suppressed under --quiet)
    pub fn message(&self, text: &str) {
        if !self.quiet && self.format == OutputFormat::Human {
            println!("{text}");
        }
    }
}
