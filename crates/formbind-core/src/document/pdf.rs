//! lopdf-backed target document
//!
//! Wraps an in-memory `lopdf::Document` behind the [`FormDocument`]
//! seam. Loading walks the AcroForm field tree exactly once and
//! resolves every terminal field into a tagged kind, so placement can
//! match exhaustively instead of probing dictionary shapes per field.
//!
//! Coordinate drawing appends a text block to the page content stream
//! using a standard Helvetica resource registered on first use; native
//! mutation sets `/V` (and `/AS` for button states) and flips
//! `NeedAppearances` at save time so viewers regenerate appearances.

use super::{FormDocument, NativeFieldKind};
use crate::{Error, Result};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Radio-button flag bit in a Btn field's /Ff entry
const FF_RADIO: i64 = 1 << 15;

/// Font resource name used for overlay text
const OVERLAY_FONT: &[u8] = b"FbHelv";

/// One resolved AcroForm field
#[derive(Debug, Clone)]
struct NativeField {
    id: ObjectId,
    kind: NativeFieldKind,
    /// Btn fields with the radio flag select by appearance-state name
    radio: bool,
    /// First non-Off appearance state, for checkbox checking
    on_state: Option<String>,
    /// Widget annotations carrying /AS for this field
    widgets: Vec<ObjectId>,
}

/// A mutable PDF document with its pages and native fields indexed
#[derive(Debug)]
pub struct PdfDocument {
    doc: Document,
    /// Page object ids in 1-indexed order
    pages: Vec<ObjectId>,
    fields: HashMap<String, NativeField>,
    /// Pages already carrying the overlay font resource
    fonted_pages: HashSet<ObjectId>,
    font_id: Option<ObjectId>,
    /// Whether any native field was mutated (drives NeedAppearances)
    touched_native: bool,
}

impl PdfDocument {
    /// Parse a PDF from bytes. Failure here is structural: nothing
    /// about the render can proceed.
    pub fn load(bytes: &[u8]) -> Result<Self> {
        let doc = Document::load_mem(bytes).map_err(|e| Error::DocumentLoad {
            message: e.to_string(),
            source: Some(anyhow::Error::new(e)),
        })?;

        let page_map: BTreeMap<u32, ObjectId> = doc.get_pages();
        let pages: Vec<ObjectId> = page_map.into_values().collect();
        let fields = collect_fields(&doc);

        tracing::debug!(
            pages = pages.len(),
            native_fields = fields.len(),
            "document loaded"
        );

        Ok(Self {
            doc,
            pages,
            fields,
            fonted_pages: HashSet::new(),
            font_id: None,
            touched_native: false,
        })
    }

    /// Native fields by qualified name with their resolved kinds,
    /// sorted for stable listings.
    pub fn native_fields(&self) -> Vec<(String, NativeFieldKind)> {
        let mut out: Vec<_> = self
            .fields
            .iter()
            .map(|(name, field)| (name.clone(), field.kind))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        out
    }

    fn field(&self, name: &str) -> Result<&NativeField> {
        self.fields.get(name).ok_or_else(|| Error::Document {
            message: format!("native field '{name}' not found"),
            source: None,
        })
    }

    fn field_dict_mut(&mut self, id: ObjectId) -> Result<&mut Dictionary> {
        Ok(self.doc.get_object_mut(id)?.as_dict_mut()?)
    }

    /// Set a name-valued state on the field and every widget that
    /// carries an appearance.
    fn set_button_state(&mut self, field: &NativeField, state: &str) -> Result<()> {
        let state_name = || Object::Name(state.as_bytes().to_vec());

        let dict = self.field_dict_mut(field.id)?;
        dict.set("V", state_name());
        dict.set("AS", state_name());

        for widget in &field.widgets {
            if let Ok(dict) = self.field_dict_mut(*widget) {
                dict.set("AS", state_name());
            }
        }
        Ok(())
    }

    /// Make sure the overlay Helvetica font is registered on the page
    fn ensure_page_font(&mut self, page_id: ObjectId) -> Result<()> {
        if self.fonted_pages.contains(&page_id) {
            return Ok(());
        }

        let font_id = match self.font_id {
            Some(id) => id,
            None => {
                let id = self.doc.add_object(dictionary! {
                    "Type" => "Font",
                    "Subtype" => "Type1",
                    "BaseFont" => "Helvetica",
                });
                self.font_id = Some(id);
                id
            }
        };

        // Resources may live inline on the page or behind a reference
        let resources_ref = {
            let page = self.doc.get_dictionary(page_id)?;
            match page.get(b"Resources") {
                Ok(Object::Reference(id)) => Some(*id),
                _ => None,
            }
        };

        match resources_ref {
            Some(res_id) => {
                let resources = self.doc.get_object_mut(res_id)?.as_dict_mut()?;
                upsert_font(resources, font_id);
            }
            None => {
                let page = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
                if !matches!(page.get(b"Resources"), Ok(Object::Dictionary(_))) {
                    page.set("Resources", Dictionary::new());
                }
                if let Ok(Object::Dictionary(resources)) = page.get_mut(b"Resources") {
                    upsert_font(resources, font_id);
                }
            }
        }

        self.fonted_pages.insert(page_id);
        Ok(())
    }

    fn set_need_appearances(&mut self) -> Result<()> {
        let root_id = self.doc.trailer.get(b"Root")?.as_reference()?;

        let acroform_ref = {
            let catalog = self.doc.get_dictionary(root_id)?;
            match catalog.get(b"AcroForm") {
                Ok(Object::Reference(id)) => Some(*id),
                Ok(Object::Dictionary(_)) => None,
                _ => return Ok(()),
            }
        };

        match acroform_ref {
            Some(id) => {
                self.doc
                    .get_object_mut(id)?
                    .as_dict_mut()?
                    .set("NeedAppearances", true);
            }
            None => {
                let catalog = self.doc.get_object_mut(root_id)?.as_dict_mut()?;
                if let Ok(Object::Dictionary(acroform)) = catalog.get_mut(b"AcroForm") {
                    acroform.set("NeedAppearances", true);
                }
            }
        }
        Ok(())
    }
}

impl FormDocument for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn native_field_kind(&self, name: &str) -> Option<NativeFieldKind> {
        self.fields.get(name).map(|f| f.kind)
    }

    fn fill_text(&mut self, name: &str, value: &str) -> Result<()> {
        let field = self.field(name)?.clone();
        let dict = self.field_dict_mut(field.id)?;
        dict.set("V", Object::string_literal(value));
        self.touched_native = true;
        Ok(())
    }

    fn check(&mut self, name: &str) -> Result<()> {
        let field = self.field(name)?.clone();
        let state = field.on_state.clone().unwrap_or_else(|| "Yes".to_string());
        self.set_button_state(&field, &state)?;
        self.touched_native = true;
        Ok(())
    }

    fn select(&mut self, name: &str, option: &str) -> Result<()> {
        let field = self.field(name)?.clone();
        if field.radio {
            self.set_button_state(&field, option)?;
        } else {
            let dict = self.field_dict_mut(field.id)?;
            dict.set("V", Object::string_literal(option));
        }
        self.touched_native = true;
        Ok(())
    }

    fn draw_text(&mut self, page: u32, x: f64, y: f64, text: &str, size: f64) -> Result<()> {
        let page_id = *page
            .checked_sub(1)
            .and_then(|i| self.pages.get(i as usize))
            .ok_or_else(|| Error::Document {
                message: format!("page {page} not found"),
                source: None,
            })?;

        self.ensure_page_font(page_id)?;

        let block = Content {
            operations: vec![
                Operation::new("q", vec![]),
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec![Object::Name(OVERLAY_FONT.to_vec()), size.into()]),
                Operation::new("rg", vec![0.into(), 0.into(), 0.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
                Operation::new("Q", vec![]),
            ],
        };

        let mut content = self.doc.get_page_content(page_id).unwrap_or_default();
        content.push(b'\n');
        content.extend(block.encode()?);

        // A freshly authored page may carry no /Contents at all;
        // change_page_content requires one, so create the stream then.
        let has_contents = self
            .doc
            .get_dictionary(page_id)
            .map(|page| page.has(b"Contents"))
            .unwrap_or(false);
        if has_contents {
            self.doc.change_page_content(page_id, content)?;
        } else {
            let stream_id = self
                .doc
                .add_object(Object::Stream(Stream::new(Dictionary::new(), content)));
            let page = self.doc.get_object_mut(page_id)?.as_dict_mut()?;
            page.set("Contents", Object::Reference(stream_id));
        }
        Ok(())
    }

    fn text_width(&self, text: &str, size: f64) -> f64 {
        helvetica_width(text, size)
    }

    fn save(&mut self) -> Result<Vec<u8>> {
        if self.touched_native {
            self.set_need_appearances()?;
        }
        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes)?;
        Ok(bytes)
    }
}

fn upsert_font(resources: &mut Dictionary, font_id: ObjectId) {
    if !matches!(resources.get(b"Font"), Ok(Object::Dictionary(_))) {
        resources.set("Font", Dictionary::new());
    }
    if let Ok(Object::Dictionary(fonts)) = resources.get_mut(b"Font") {
        fonts.set(OVERLAY_FONT, Object::Reference(font_id));
    }
}

/// Follow a reference one level; non-references pass through
fn deref<'a>(doc: &'a Document, object: &'a Object) -> &'a Object {
    match object {
        Object::Reference(id) => doc.get_object(*id).unwrap_or(object),
        other => other,
    }
}

fn string_value(object: &Object) -> Option<String> {
    match object {
        Object::String(bytes, _) => Some(String::from_utf8_lossy(bytes).into_owned()),
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Walk the AcroForm field tree once, resolving every terminal field
/// into a qualified name and a tagged kind.
fn collect_fields(doc: &Document) -> HashMap<String, NativeField> {
    let mut table = HashMap::new();

    let roots: Vec<ObjectId> = (|| {
        let root_id = doc.trailer.get(b"Root").ok()?.as_reference().ok()?;
        let catalog = doc.get_dictionary(root_id).ok()?;
        let acroform = deref(doc, catalog.get(b"AcroForm").ok()?).as_dict().ok()?;
        let fields = deref(doc, acroform.get(b"Fields").ok()?).as_array().ok()?;
        Some(
            fields
                .iter()
                .filter_map(|o| o.as_reference().ok())
                .collect(),
        )
    })()
    .unwrap_or_default();

    for id in roots {
        walk_field(doc, id, None, None, &mut table);
    }
    table
}

fn walk_field(
    doc: &Document,
    id: ObjectId,
    prefix: Option<&str>,
    inherited_ft: Option<&[u8]>,
    table: &mut HashMap<String, NativeField>,
) {
    let Ok(dict) = doc.get_dictionary(id) else {
        return;
    };

    let partial = dict.get(b"T").ok().and_then(string_value);
    let name = match (prefix, partial.as_deref()) {
        (Some(p), Some(t)) => Some(format!("{p}.{t}")),
        (Some(p), None) => Some(p.to_string()),
        (None, Some(t)) => Some(t.to_string()),
        (None, None) => None,
    };

    let ft: Option<Vec<u8>> = dict
        .get(b"FT")
        .ok()
        .and_then(|o| o.as_name().ok().map(|n| n.to_vec()))
        .or_else(|| inherited_ft.map(|f| f.to_vec()));

    let kids: Vec<ObjectId> = dict
        .get(b"Kids")
        .ok()
        .map(|o| deref(doc, o))
        .and_then(|o| o.as_array().ok())
        .map(|a| a.iter().filter_map(|o| o.as_reference().ok()).collect())
        .unwrap_or_default();

    // Kids carrying their own /T are child fields; recurse. Kids
    // without /T are this field's widget annotations.
    let has_child_fields = kids.iter().any(|kid| {
        doc.get_dictionary(*kid)
            .map(|d| d.has(b"T"))
            .unwrap_or(false)
    });
    if has_child_fields {
        for kid in kids {
            walk_field(doc, kid, name.as_deref(), ft.as_deref(), table);
        }
        return;
    }

    let (Some(name), Some(ft)) = (name, ft) else {
        return;
    };

    let (kind, radio) = match ft.as_slice() {
        b"Tx" => (NativeFieldKind::Text, false),
        b"Ch" => (NativeFieldKind::Choice, false),
        b"Btn" => {
            let flags = dict
                .get(b"Ff")
                .ok()
                .and_then(|o| o.as_i64().ok())
                .unwrap_or(0);
            if flags & FF_RADIO != 0 {
                (NativeFieldKind::Choice, true)
            } else {
                (NativeFieldKind::Checkbox, false)
            }
        }
        _ => return,
    };

    let on_state = find_on_state(doc, dict, &kids);

    table.insert(
        name,
        NativeField {
            id,
            kind,
            radio,
            on_state,
            widgets: kids,
        },
    );
}

/// First non-Off appearance state on the field or one of its widgets
fn find_on_state(doc: &Document, dict: &Dictionary, widgets: &[ObjectId]) -> Option<String> {
    let candidates = std::iter::once(dict).chain(
        widgets
            .iter()
            .filter_map(|id| doc.get_dictionary(*id).ok()),
    );

    for candidate in candidates {
        let Some(normal) = candidate
            .get(b"AP")
            .ok()
            .map(|o| deref(doc, o))
            .and_then(|o| o.as_dict().ok())
            .and_then(|ap| ap.get(b"N").ok())
            .map(|o| deref(doc, o))
            .and_then(|o| o.as_dict().ok())
        else {
            continue;
        };
        for (state, _) in normal.iter() {
            if state.as_slice() != b"Off" {
                return Some(String::from_utf8_lossy(state).into_owned());
            }
        }
    }
    None
}

/// Standard Helvetica AFM widths for ASCII 32..=126, in 1000ths of
/// the font size. Characters outside the table use a conservative
/// average.
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584, // 'p'..'~'
];

const HELVETICA_FALLBACK_WIDTH: u16 = 556;

fn helvetica_width(text: &str, size: f64) -> f64 {
    let units: u64 = text
        .chars()
        .map(|c| {
            let code = c as u32;
            if (32..=126).contains(&code) {
                HELVETICA_WIDTHS[(code - 32) as usize] as u64
            } else {
                HELVETICA_FALLBACK_WIDTH as u64
            }
        })
        .sum();
    units as f64 * size / 1000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_pdf(pages: usize) -> Vec<u8> {
        let mut doc = Document::with_version("1.7");
        let pages_id = doc.new_object_id();

        let kids: Vec<Object> = (0..pages)
            .map(|_| {
                let page_id = doc.add_object(dictionary! {
                    "Type" => "Page",
                    "Parent" => Object::Reference(pages_id),
                    "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
                });
                Object::Reference(page_id)
            })
            .collect();

        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => pages as i64,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => Object::Reference(pages_id),
        });
        doc.trailer.set("Root", Object::Reference(catalog_id));

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_load_counts_pages() {
        let doc = PdfDocument::load(&blank_pdf(2)).unwrap();
        assert_eq!(doc.page_count(), 2);
        assert!(doc.native_fields().is_empty());
    }

    #[test]
    fn test_load_rejects_garbage() {
        let err = PdfDocument::load(b"not a pdf").unwrap_err();
        assert!(matches!(err, Error::DocumentLoad { .. }));
    }

    #[test]
    fn test_draw_text_appends_to_content() {
        let mut doc = PdfDocument::load(&blank_pdf(1)).unwrap();
        doc.draw_text(1, 100.0, 700.0, "Hello", 10.0).unwrap();
        let bytes = doc.save().unwrap();

        let reloaded = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = reloaded.get_pages().into_iter().next().unwrap();
        let content = reloaded.get_page_content(page_id).unwrap();
        let text = String::from_utf8_lossy(&content);
        assert!(text.contains("Hello"), "content: {text}");
        assert!(text.contains("Tj"), "content: {text}");
    }

    #[test]
    fn test_draw_text_on_page_without_contents() {
        // Freshly authored pages carry no /Contents entry; the first
        // draw creates the stream, the second appends to it.
        let mut doc = PdfDocument::load(&blank_pdf(1)).unwrap();
        doc.draw_text(1, 100.0, 700.0, "first", 10.0).unwrap();
        doc.draw_text(1, 100.0, 680.0, "second", 10.0).unwrap();
        let bytes = doc.save().unwrap();

        let reloaded = Document::load_mem(&bytes).unwrap();
        let (_, page_id) = reloaded.get_pages().into_iter().next().unwrap();
        let text = String::from_utf8_lossy(&reloaded.get_page_content(page_id).unwrap()).into_owned();
        assert!(text.contains("first"), "content: {text}");
        assert!(text.contains("second"), "content: {text}");
    }

    #[test]
    fn test_draw_text_missing_page() {
        let mut doc = PdfDocument::load(&blank_pdf(1)).unwrap();
        let err = doc.draw_text(2, 0.0, 0.0, "x", 10.0).unwrap_err();
        assert!(matches!(err, Error::Document { .. }));
    }

    #[test]
    fn test_helvetica_width() {
        // 'H' = 722, 'i' = 222
        let w = helvetica_width("Hi", 10.0);
        assert!((w - 9.44).abs() < 1e-9, "width {w}");
        assert_eq!(helvetica_width("", 10.0), 0.0);
    }

    #[test]
    fn test_save_round_trips() {
        let mut doc = PdfDocument::load(&blank_pdf(1)).unwrap();
        let bytes = doc.save().unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(PdfDocument::load(&bytes).is_ok());
    }
}
