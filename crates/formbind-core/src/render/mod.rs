//! Render engine: per-field pipeline and placement dispatch
//!
//! One render invocation makes a single pass over the compiled field
//! list. Each field runs Condition → Resolver → Transform → Formatter;
//! the result is dispatched to native-field placement or coordinate
//! placement. Under native mode, fields without a native identifier
//! are collected and re-dispatched through coordinate placement in a
//! second pass restricted to that subset; no field is placed twice.
//!
//! Copyright (c) 2025 Formbind Team
//! Licensed under the Apache-2.0 license

pub mod condition;
pub mod format;
pub mod path;
pub mod report;
pub mod transform;

pub use report::{Diagnostic, RenderReport};

use crate::annotation::{Annotation, CompiledAnnotation, CompiledField};
use crate::document::{FormDocument, NativeFieldKind, PdfDocument};
use crate::render::format::Rendered;
use crate::Result;
use serde_json::Value;

/// Horizontal inset from the rectangle edge for left/right alignment
const TEXT_INSET: f64 = 2.0;

/// Default font size for coordinate placement
const DEFAULT_FONT_SIZE: f64 = 10.0;

/// Default mark glyph for an active checkbox
const DEFAULT_CHECK_GLYPH: &str = "X";

/// Options governing one render invocation
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    /// Prefer native-field placement. `None` means automatic: native
    /// mode is used exactly when the annotation declares at least one
    /// native field id.
    pub prefer_native_fields: Option<bool>,
    /// Treat currency amounts that parse to exactly zero as empty
    /// (omit-zero policy). Off in the generic renderer.
    pub suppress_zero_currency: bool,
}

/// Result of a whole-document fill: serialized bytes plus the report
#[derive(Debug)]
pub struct FillOutcome {
    pub bytes: Vec<u8>,
    pub report: RenderReport,
}

/// Load a PDF, render an annotation against a data document into it,
/// and serialize it back.
///
/// This is the primary public entry point. Only structural failures
/// (the document failing to load or serialize) propagate as errors;
/// per-field issues are aggregated into the report.
pub fn fill_form(
    document_bytes: &[u8],
    annotation: &Annotation,
    data: &Value,
    options: &RenderOptions,
) -> Result<FillOutcome> {
    let compiled = annotation.compile()?;
    let mut document = PdfDocument::load(document_bytes)?;
    let report = render(&mut document, &compiled, data, options);
    let bytes = document.save()?;
    Ok(FillOutcome { bytes, report })
}

/// Render a compiled annotation into an open document.
///
/// Single-threaded, synchronous per field; field order does not affect
/// correctness because fields are independent.
pub fn render(
    document: &mut dyn FormDocument,
    annotation: &CompiledAnnotation,
    data: &Value,
    options: &RenderOptions,
) -> RenderReport {
    let native_mode = options
        .prefer_native_fields
        .unwrap_or(annotation.has_native)
        && annotation.has_native;

    tracing::info!(
        fields = annotation.fields.len(),
        native_mode,
        "starting render"
    );

    let mut report = RenderReport::new();
    let mut deferred: Vec<(&CompiledField, Rendered)> = Vec::new();

    for field in &annotation.fields {
        if !field.condition.evaluate(data) {
            report.record_skipped();
            continue;
        }

        let Some(rendered) = resolve_and_format(field, data, options) else {
            report.record_skipped();
            continue;
        };

        if native_mode {
            if field.def.native_field_id.is_some() {
                place_native(document, field, &rendered, &mut report);
            } else {
                report.record_fallback();
                deferred.push((field, rendered));
            }
        } else {
            place_coordinate(document, field, &rendered, &mut report);
        }
    }

    // Second pass: fields deferred from native mode, coordinate only
    for (field, rendered) in deferred {
        place_coordinate(document, field, &rendered, &mut report);
    }

    tracing::info!(
        filled = report.filled_count,
        fallback = report.fallback_count,
        errors = report.error_count,
        "render complete"
    );

    report
}

/// Resolver → transform → formatter for one field. `None` means the
/// formatted value is empty and placement is skipped (not an error).
fn resolve_and_format(
    field: &CompiledField,
    data: &Value,
    options: &RenderOptions,
) -> Option<Rendered> {
    let resolved = match field.path.resolve(data) {
        Some(value) => value,
        None => field.def.binding.fallback.clone()?,
    };

    let transformed = match &field.def.binding.transform {
        Some(name) => transform::apply(resolved, name),
        None => resolved,
    };

    let rendered = format::format_value(
        &transformed,
        field.def.field_type,
        &field.def.format,
        options.suppress_zero_currency,
    );

    if rendered.is_empty() {
        None
    } else {
        Some(rendered)
    }
}

/// Native placement: set the target document's interactive field by
/// identifier. Failures here are recoverable per-field errors.
fn place_native(
    document: &mut dyn FormDocument,
    field: &CompiledField,
    rendered: &Rendered,
    report: &mut RenderReport,
) {
    // Checked above: native mode only dispatches declared ids here
    let Some(name) = field.def.native_field_id.as_deref() else {
        return;
    };

    let Some(kind) = document.native_field_kind(name) else {
        report.record_error(
            &field.def.id,
            format!("native field '{name}' not found on document"),
        );
        return;
    };

    let result = match (kind, rendered) {
        (NativeFieldKind::Text, Rendered::Text(text)) => {
            // Length-constrained fields take the bare digit string
            let value = if field.def.field_type.strips_separators() {
                text.replace('-', "")
            } else {
                text.clone()
            };
            document.fill_text(name, &value)
        }
        (NativeFieldKind::Checkbox, Rendered::Check(true)) => document.check(name),
        (NativeFieldKind::Choice, rendered) => {
            let option = field
                .def
                .format
                .export_value
                .clone()
                .unwrap_or_else(|| match rendered {
                    Rendered::Text(text) => text.clone(),
                    Rendered::Check(_) => String::new(),
                });
            if option.is_empty() {
                report.record_error(
                    &field.def.id,
                    format!("choice field '{name}' has no option value to select"),
                );
                return;
            }
            document.select(name, &option)
        }
        (kind, _) => {
            report.record_error(
                &field.def.id,
                format!("type mismatch: native field '{name}' is {kind}"),
            );
            return;
        }
    };

    match result {
        Ok(()) => report.record_filled(),
        Err(e) => report.record_error(&field.def.id, e.to_string()),
    }
}

/// Coordinate placement: draw the formatted value at the field's
/// rectangle on its declared page.
fn place_coordinate(
    document: &mut dyn FormDocument,
    field: &CompiledField,
    rendered: &Rendered,
    report: &mut RenderReport,
) {
    let page = field.def.page;
    if page == 0 || page as usize > document.page_count() {
        report.record_error(
            &field.def.id,
            format!("page {page} not found (document has {})", document.page_count()),
        );
        return;
    }

    let (x, y, width, height) = field.def.position.to_points();
    let size = field.def.format.font_size.unwrap_or(DEFAULT_FONT_SIZE);

    let (text, origin_x) = match rendered {
        Rendered::Text(text) => {
            let measured = document.text_width(text, size);
            let origin_x = match field.def.format.align {
                crate::annotation::Alignment::Left => x + TEXT_INSET,
                crate::annotation::Alignment::Right => x + width - TEXT_INSET - measured,
                crate::annotation::Alignment::Center => x + (width - measured) / 2.0,
            };
            (text.clone(), origin_x)
        }
        Rendered::Check(true) => {
            let glyph = field
                .def
                .format
                .check_glyph
                .clone()
                .unwrap_or_else(|| DEFAULT_CHECK_GLYPH.to_string());
            let measured = document.text_width(&glyph, size);
            (glyph, x + (width - measured) / 2.0)
        }
        // Unchecked marks never reach placement
        Rendered::Check(false) => return,
    };

    let origin_y = y + (height - size) / 2.0;

    match document.draw_text(page, origin_x, origin_y, &text, size) {
        Ok(()) => report.record_filled(),
        Err(e) => report.record_error(&field.def.id, e.to_string()),
    }
}
