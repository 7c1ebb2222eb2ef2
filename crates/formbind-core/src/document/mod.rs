//! Target document abstraction
//!
//! The render orchestrator talks to the target document through this
//! seam: page enumeration, native interactive fields, and coordinate
//! drawing. The one production implementation is [`pdf::PdfDocument`];
//! tests substitute recording doubles.

pub mod pdf;

pub use pdf::PdfDocument;

use crate::Result;

/// The kind of a native interactive field, resolved once when the
/// document's field table is built and matched exhaustively at
/// placement time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NativeFieldKind {
    /// Free text entry
    Text,
    /// Checkbox-class button: checked or not
    Checkbox,
    /// Choice/radio-class: selects one declared option value
    Choice,
}

impl std::fmt::Display for NativeFieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NativeFieldKind::Text => write!(f, "text"),
            NativeFieldKind::Checkbox => write!(f, "checkbox"),
            NativeFieldKind::Choice => write!(f, "choice"),
        }
    }
}

/// A mutable in-memory target document.
///
/// One render call exclusively owns the document; concurrent renders
/// of the same instance are unsupported.
pub trait FormDocument {
    /// Number of pages, for 1-indexed page validation
    fn page_count(&self) -> usize;

    /// Look up a native field's kind by identifier. `None` means the
    /// identifier does not resolve on this document.
    fn native_field_kind(&self, name: &str) -> Option<NativeFieldKind>;

    /// Set a text-class field's content
    fn fill_text(&mut self, name: &str, value: &str) -> Result<()>;

    /// Check a checkbox-class field. Unchecking is never requested;
    /// false values are simply not placed.
    fn check(&mut self, name: &str) -> Result<()>;

    /// Select an option on a choice-class field
    fn select(&mut self, name: &str, option: &str) -> Result<()>;

    /// Draw text at an absolute position on a 1-indexed page,
    /// origin bottom-left, in the document's default font
    fn draw_text(&mut self, page: u32, x: f64, y: f64, text: &str, size: f64) -> Result<()>;

    /// Width in points of `text` at `size` in the default font
    fn text_width(&self, text: &str, size: f64) -> f64;

    /// Serialize the mutated document back to bytes
    fn save(&mut self) -> Result<Vec<u8>>;
}
