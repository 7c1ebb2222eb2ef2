//! Formbind Core - annotation-driven PDF form filling
//!
//! This crate binds a generic JSON annotation (field positions, types,
//! data paths) to an arbitrary nested data document and writes the
//! resolved values into a PDF, either through its native interactive
//! fields or as overlaid text at fixed coordinates.
//!
//! # Main Components
//!
//! - **Error Handling**: error types using `thiserror` and `anyhow`
//! - **Annotation**: the wire contract for field definitions, with a
//!   compile step that parses paths and conditions once
//! - **Render Engine**: per-field Condition → Resolve → Transform →
//!   Format pipeline with native/coordinate placement dispatch
//! - **Document**: the target-document seam and its `lopdf` backend
//!
//! # Example
//!
//! ```no_run
//! use formbind_core::{fill_form, Annotation, RenderOptions};
//!
//! fn example() -> formbind_core::Result<()> {
//!     let pdf = std::fs::read("f1040.pdf")?;
//!     let annotation = Annotation::from_json(&std::fs::read_to_string("f1040.json")?)?;
//!     let data: serde_json::Value =
//!         serde_json::from_str(&std::fs::read_to_string("return.json")?)?;
//!
//!     let outcome = fill_form(&pdf, &annotation, &data, &RenderOptions::default())?;
//!     std::fs::write("filled.pdf", &outcome.bytes)?;
//!     println!(
//!         "filled {} fields ({} errors)",
//!         outcome.report.filled_count, outcome.report.error_count
//!     );
//!     Ok(())
//! }
//! ```

pub mod annotation;
pub mod document;
pub mod error;
pub mod render;

// Re-export main types for convenience
pub use annotation::{
    Alignment, Annotation, Binding, CompiledAnnotation, CompiledField, FieldDef, FieldType,
    FormInfo, FormatOptions, PageSize, Position, Unit,
};
pub use document::{FormDocument, NativeFieldKind, PdfDocument};
pub use error::{Error, Result, Severity};
pub use render::{fill_form, render, Diagnostic, FillOutcome, RenderOptions, RenderReport};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_error_creation() {
        let err = Error::Annotation {
            message: "test".to_string(),
            field: None,
        };
        assert!(err.to_string().contains("test"));
    }
}
