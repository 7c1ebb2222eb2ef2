//! Annotation wire contract and compilation
//!
//! The annotation is the static description of a form's fields,
//! positions, and data bindings. Its JSON shape is the interoperability
//! contract between annotation authors and the renderer: existing
//! annotation files must keep loading unchanged.
//!
//! Loading is tolerant (unknown keys ignored, optional sections
//! defaulted); compilation parses each field's binding path and
//! condition exactly once so the render loop never re-parses strings.

use crate::render::condition::Condition;
use crate::render::path::PathExpr;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A complete form annotation: descriptive metadata plus an ordered
/// field list. Field order determines placement sequence but not
/// correctness.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Annotation {
    /// Form metadata, descriptive only
    #[serde(default)]
    pub form: FormInfo,
    /// Ordered field definitions
    pub fields: Vec<FieldDef>,
}

/// Descriptive form metadata. Not consumed by the render pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormInfo {
    pub id: Option<String>,
    pub name: Option<String>,
    pub tax_year: Option<i32>,
    pub page_count: Option<u32>,
    pub page_size: Option<PageSize>,
}

/// Declared page dimensions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: Unit,
}

/// One field of the annotation
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDef {
    /// Unique identifier within the annotation, used for diagnostics
    pub id: String,
    /// Semantic type governing formatting
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// 1-indexed page number
    pub page: u32,
    /// Placement rectangle, origin bottom-left
    pub position: Position,
    /// How to obtain and filter the value
    pub binding: Binding,
    /// Type-specific rendering options
    #[serde(default)]
    pub format: FormatOptions,
    /// Identifier of a pre-existing interactive field on the target
    /// document. Presence is the sole signal to prefer native
    /// placement for this field.
    #[serde(default)]
    pub native_field_id: Option<String>,
}

/// Semantic field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    Text,
    Currency,
    Number,
    Ssn,
    Ein,
    Date,
    Checkbox,
    Radio,
}

impl FieldType {
    /// Types rendered as a boolean mark rather than text
    pub fn is_mark(self) -> bool {
        matches!(self, FieldType::Checkbox | FieldType::Radio)
    }

    /// Types whose native text value carries no separator characters
    /// (length-constrained comb fields on real forms)
    pub fn strips_separators(self) -> bool {
        matches!(self, FieldType::Ssn | FieldType::Ein)
    }
}

/// Placement rectangle, origin bottom-left
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub unit: Unit,
}

impl Position {
    /// Convert the rectangle into PDF points
    pub fn to_points(&self) -> (f64, f64, f64, f64) {
        let s = self.unit.points_per_unit();
        (self.x * s, self.y * s, self.width * s, self.height * s)
    }
}

/// Measurement unit for positions and page sizes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    #[default]
    Points,
    Inches,
    Millimeters,
}

impl Unit {
    pub fn points_per_unit(self) -> f64 {
        match self {
            Unit::Points => 1.0,
            Unit::Inches => 72.0,
            Unit::Millimeters => 72.0 / 25.4,
        }
    }
}

/// The rule mapping a field to a value in the data document
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    /// Dot-notation path, optionally with `[n]` or `[*]` segments
    pub path: String,
    /// Named pure transform applied to the resolved value
    #[serde(default)]
    pub transform: Option<String>,
    /// Comparison expression gating the field
    #[serde(default)]
    pub condition: Option<String>,
    /// Value used when the path resolves to nothing
    #[serde(default)]
    pub fallback: Option<Value>,
}

/// Horizontal text alignment within the placement rectangle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Alignment {
    #[default]
    Left,
    Right,
    Center,
}

/// Free-form, type-specific rendering options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormatOptions {
    /// Decimal places for currency/number (defaults: 2 / 0)
    pub decimal_places: Option<u8>,
    /// Leading currency symbol, e.g. "$"
    pub symbol: Option<String>,
    /// Horizontal alignment for coordinate placement
    pub align: Alignment,
    /// Date output pattern with MM/DD/YYYY tokens
    pub date_pattern: Option<String>,
    /// Mark glyph drawn for an active checkbox (default "X")
    pub check_glyph: Option<String>,
    /// Font size for coordinate placement (default 10)
    pub font_size: Option<f64>,
    /// Option value selected on a native choice/radio field
    pub export_value: Option<String>,
}

/// An annotation with every field's path and condition parsed once.
///
/// This is the form the orchestrator consumes; nothing here is
/// re-parsed during rendering.
#[derive(Debug, Clone)]
pub struct CompiledAnnotation {
    pub form: FormInfo,
    pub fields: Vec<CompiledField>,
    /// Whether any field declares a native field id
    pub has_native: bool,
}

/// One field with its compiled binding machinery
#[derive(Debug, Clone)]
pub struct CompiledField {
    pub def: FieldDef,
    pub path: PathExpr,
    pub condition: Condition,
}

impl Annotation {
    /// Parse an annotation from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        let annotation: Annotation = serde_json::from_str(text)?;
        Ok(annotation)
    }

    /// Compile every field's binding path and condition.
    ///
    /// An unparseable binding path is an authoring error in a static
    /// artifact and fails compilation outright. A malformed condition
    /// is not: per the contract it degrades to always-active, with a
    /// warning.
    pub fn compile(&self) -> Result<CompiledAnnotation> {
        let mut fields = Vec::with_capacity(self.fields.len());

        for def in &self.fields {
            let path = PathExpr::parse(&def.binding.path).map_err(|e| {
                Error::annotation_field(&def.id, format!("invalid binding path: {}", e))
            })?;

            let condition = match &def.binding.condition {
                Some(expr) => {
                    let parsed = Condition::parse(expr);
                    if parsed.is_always() && !expr.trim().is_empty() {
                        tracing::warn!(
                            field = %def.id,
                            condition = %expr,
                            "malformed condition, treating field as always active"
                        );
                    }
                    parsed
                }
                None => Condition::Always,
            };

            fields.push(CompiledField {
                def: def.clone(),
                path,
                condition,
            });
        }

        let has_native = fields.iter().any(|f| f.def.native_field_id.is_some());

        Ok(CompiledAnnotation {
            form: self.form.clone(),
            fields,
            has_native,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "form": {"id": "f1040", "name": "Form 1040", "taxYear": 2023},
            "fields": [
                {
                    "id": "first_name",
                    "type": "text",
                    "page": 1,
                    "position": {"x": 72.0, "y": 700.0, "width": 120.0, "height": 14.0},
                    "binding": {"path": "taxpayer.firstName", "transform": "uppercase"}
                },
                {
                    "id": "total_income",
                    "type": "currency",
                    "page": 1,
                    "position": {"x": 400.0, "y": 500.0, "width": 90.0, "height": 12.0, "unit": "points"},
                    "binding": {"path": "income.total"},
                    "format": {"align": "right"},
                    "nativeFieldId": "topmostSubform[0].Page1[0].f1_28[0]"
                }
            ]
        })
    }

    #[test]
    fn test_wire_shape_round_trip() {
        let annotation: Annotation = serde_json::from_value(sample()).unwrap();
        assert_eq!(annotation.fields.len(), 2);
        assert_eq!(annotation.form.tax_year, Some(2023));
        assert_eq!(annotation.fields[0].field_type, FieldType::Text);
        assert_eq!(annotation.fields[0].binding.transform.as_deref(), Some("uppercase"));
        assert_eq!(annotation.fields[1].format.align, Alignment::Right);
        assert!(annotation.fields[1].native_field_id.is_some());
    }

    #[test]
    fn test_defaults_are_tolerant() {
        let annotation: Annotation = serde_json::from_value(json!({
            "fields": [{
                "id": "a",
                "type": "checkbox",
                "page": 1,
                "position": {"x": 0.0, "y": 0.0, "width": 10.0, "height": 10.0},
                "binding": {"path": "flags.any"}
            }]
        }))
        .unwrap();
        assert_eq!(annotation.fields[0].position.unit, Unit::Points);
        assert!(annotation.fields[0].binding.fallback.is_none());
        assert!(annotation.form.id.is_none());
    }

    #[test]
    fn test_compile_marks_native_presence() {
        let annotation: Annotation = serde_json::from_value(sample()).unwrap();
        let compiled = annotation.compile().unwrap();
        assert!(compiled.has_native);
        assert_eq!(compiled.fields.len(), 2);
    }

    #[test]
    fn test_compile_rejects_double_wildcard() {
        let mut annotation: Annotation = serde_json::from_value(sample()).unwrap();
        annotation.fields[0].binding.path = "a[*].b[*].c".to_string();
        let err = annotation.compile().unwrap_err();
        match err {
            Error::Annotation { field, .. } => assert_eq!(field.as_deref(), Some("first_name")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_unit_conversion() {
        let pos = Position {
            x: 1.0,
            y: 2.0,
            width: 1.0,
            height: 0.5,
            unit: Unit::Inches,
        };
        let (x, y, w, h) = pos.to_points();
        assert_eq!(x, 72.0);
        assert_eq!(y, 144.0);
        assert_eq!(w, 72.0);
        assert_eq!(h, 36.0);
    }
}
