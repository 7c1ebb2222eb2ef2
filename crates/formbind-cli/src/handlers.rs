//! Subcommand handlers
//!
//! Each handler reads its inputs, delegates to formbind-core, and
//! writes results through the output writer. Per-field render errors
//! are reported but do not fail the process; only structural failures
//! propagate.

use crate::cli::{FieldsArgs, FillArgs, ValidateArgs};
use crate::error::{Error, Result};
use crate::output::OutputWriter;
use formbind_core::{fill_form, Annotation, PdfDocument, RenderOptions};
use serde_json::Value;
use std::fs;
use std::path::Path;

fn read_file(path: &Path) -> Result<Vec<u8>> {
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    Ok(fs::read(path)?)
}

fn read_json(path: &Path) -> Result<Value> {
    let bytes = read_file(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Handle the fill command
pub fn handle_fill(args: FillArgs, output: &OutputWriter) -> Result<()> {
    let pdf = read_file(&args.input)?;
    let annotation: Annotation = serde_json::from_value(read_json(&args.annotation)?)?;
    let data = read_json(&args.data)?;

    let options = RenderOptions {
        prefer_native_fields: if args.no_native { Some(false) } else { None },
        suppress_zero_currency: args.suppress_zero,
    };

    tracing::info!(
        input = %args.input.display(),
        fields = annotation.fields.len(),
        "filling form"
    );

    let outcome = fill_form(&pdf, &annotation, &data, &options)?;
    fs::write(&args.output_file, &outcome.bytes)?;

    output.render_report(&outcome.report, &args.output_file.display().to_string())?;
    Ok(())
}

/// Handle the fields command
pub fn handle_fields(args: FieldsArgs, output: &OutputWriter) -> Result<()> {
    let pdf = read_file(&args.input)?;
    let document = PdfDocument::load(&pdf)?;
    output.field_list(&document.native_fields())?;
    Ok(())
}

/// Handle the validate command
pub fn handle_validate(args: ValidateArgs, output: &OutputWriter) -> Result<()> {
    let annotation: Annotation = serde_json::from_value(read_json(&args.annotation)?)?;
    let compiled = annotation.compile()?;

    output.message(&format!(
        "{}: {} field(s), {}",
        args.annotation.display(),
        compiled.fields.len(),
        if compiled.has_native {
            "native ids present"
        } else {
            "coordinate-only"
        }
    ));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use serde_json::json;
    use std::io::Write;

    fn writer() -> OutputWriter {
        OutputWriter::new(OutputFormat::Human, false, true)
    }

    #[test]
    fn test_missing_file_is_reported() {
        let args = FieldsArgs {
            input: "definitely/not/here.pdf".into(),
        };
        let err = handle_fields(args, &writer()).unwrap_err();
        assert!(matches!(err, Error::FileNotFound { .. }));
    }

    #[test]
    fn test_validate_happy_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let annotation = json!({
            "fields": [{
                "id": "a",
                "type": "text",
                "page": 1,
                "position": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0},
                "binding": {"path": "x.y"}
            }]
        });
        file.write_all(annotation.to_string().as_bytes()).unwrap();

        let args = ValidateArgs {
            annotation: file.path().to_path_buf(),
        };
        assert!(handle_validate(args, &writer()).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        let annotation = json!({
            "fields": [{
                "id": "a",
                "type": "text",
                "page": 1,
                "position": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0},
                "binding": {"path": "a[*].b[*].c"}
            }]
        });
        file.write_all(annotation.to_string().as_bytes()).unwrap();

        let args = ValidateArgs {
            annotation: file.path().to_path_buf(),
        };
        let err = handle_validate(args, &writer()).unwrap_err();
        assert!(matches!(err, Error::Core(_)));
    }
}
