//! Type-aware value formatting
//!
//! Turns a transformed value into its final on-document
//! representation: a string for text-class types, a boolean for
//! checkbox-class types. Formatting never raises; malformed input
//! degrades to empty or unformatted output and the orchestrator
//! decides whether that means "skip".
//!
//! Copyright (c) 2025 Formbind Team
//! Licensed under the Apache-2.0 license

use crate::annotation::{FieldType, FormatOptions};
use crate::render::transform::{as_number, stringify};
use chrono::NaiveDate;
use serde_json::Value;

/// The final, placeable form of one field's value
#[derive(Debug, Clone, PartialEq)]
pub enum Rendered {
    /// Placed as text; empty string means "skip this field"
    Text(String),
    /// Placed as a mark; false means "skip this field"
    Check(bool),
}

impl Rendered {
    /// Whether the orchestrator should skip placement entirely
    pub fn is_empty(&self) -> bool {
        match self {
            Rendered::Text(s) => s.is_empty(),
            Rendered::Check(checked) => !checked,
        }
    }
}

/// Date input formats accepted before rendering into the output pattern
const DATE_INPUT_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%m-%d-%Y", "%Y/%m/%d"];

const DEFAULT_DATE_PATTERN: &str = "MM/DD/YYYY";

/// Format a value according to its declared semantic type.
///
/// `suppress_zero` applies the omit-zero-amounts policy to currency
/// fields; the generic renderer leaves it off.
pub fn format_value(
    value: &Value,
    field_type: FieldType,
    options: &FormatOptions,
    suppress_zero: bool,
) -> Rendered {
    match field_type {
        FieldType::Currency => {
            Rendered::Text(format_numeric(value, options.decimal_places.unwrap_or(2), options.symbol.as_deref(), suppress_zero))
        }
        FieldType::Number => {
            Rendered::Text(format_numeric(value, options.decimal_places.unwrap_or(0), None, false))
        }
        FieldType::Ssn => Rendered::Text(format_digit_groups(value, &[3, 2, 4])),
        FieldType::Ein => Rendered::Text(format_digit_groups(value, &[2, 7])),
        FieldType::Date => Rendered::Text(format_date(
            value,
            options.date_pattern.as_deref().unwrap_or(DEFAULT_DATE_PATTERN),
        )),
        FieldType::Checkbox | FieldType::Radio => Rendered::Check(is_truthy(value)),
        FieldType::Text => Rendered::Text(stringify(value)),
    }
}

/// Loose boolean coercion matching the annotations' origin:
/// false, null, 0 and "" are false; everything else is true.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(false, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn format_numeric(value: &Value, decimals: u8, symbol: Option<&str>, suppress_zero: bool) -> String {
    let Some(number) = as_number(value) else {
        return String::new();
    };
    if suppress_zero && number == 0.0 {
        return String::new();
    }

    let fixed = format!("{:.*}", decimals as usize, number.abs());
    let (int_part, frac_part) = match fixed.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (fixed.as_str(), None),
    };

    let mut out = String::new();
    if number < 0.0 {
        out.push('-');
    }
    if let Some(symbol) = symbol {
        out.push_str(symbol);
    }
    out.push_str(&group_thousands(int_part));
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Insert thousands separators into a bare digit string
fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    let offset = digits.len() % 3;
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && i % 3 == offset % 3 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Strip non-digits and, when exactly the expected digit count
/// remains, hyphenate into the given groups (SSN: 3-2-4, EIN: 2-7).
/// Partial input passes through as the bare digit string.
fn format_digit_groups(value: &Value, groups: &[usize]) -> String {
    let digits: String = stringify(value).chars().filter(|c| c.is_ascii_digit()).collect();
    let expected: usize = groups.iter().sum();
    if digits.len() != expected {
        return digits;
    }

    let mut out = String::with_capacity(expected + groups.len() - 1);
    let mut start = 0;
    for (i, len) in groups.iter().enumerate() {
        if i > 0 {
            out.push('-');
        }
        out.push_str(&digits[start..start + len]);
        start += len;
    }
    out
}

/// Parse a calendar date and render it into the token pattern.
/// Unparseable input is returned as its original string form.
fn format_date(value: &Value, pattern: &str) -> String {
    let text = stringify(value);
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let Some(date) = parse_date(trimmed) else {
        return text;
    };

    pattern
        .replace("YYYY", &date.format("%Y").to_string())
        .replace("MM", &date.format("%m").to_string())
        .replace("DD", &date.format("%d").to_string())
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    for format in DATE_INPUT_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return Some(date);
        }
    }
    // Timestamps: take the date component
    chrono::DateTime::parse_from_rfc3339(text)
        .ok()
        .map(|dt| dt.date_naive())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn opts() -> FormatOptions {
        FormatOptions::default()
    }

    #[test]
    fn test_currency_default() {
        let r = format_value(&json!(1234.5), FieldType::Currency, &opts(), false);
        assert_eq!(r, Rendered::Text("1,234.50".to_string()));
    }

    #[test]
    fn test_currency_zero_policies() {
        let generic = format_value(&json!(0), FieldType::Currency, &opts(), false);
        assert_eq!(generic, Rendered::Text("0.00".to_string()));

        let suppressed = format_value(&json!(0), FieldType::Currency, &opts(), true);
        assert_eq!(suppressed, Rendered::Text(String::new()));
        assert!(suppressed.is_empty());
    }

    #[test]
    fn test_currency_symbol_and_decimals() {
        let options = FormatOptions {
            symbol: Some("$".to_string()),
            decimal_places: Some(0),
            ..Default::default()
        };
        let r = format_value(&json!(57890.6), FieldType::Currency, &options, false);
        assert_eq!(r, Rendered::Text("$57,891".to_string()));
    }

    #[test]
    fn test_currency_negative() {
        let r = format_value(&json!(-1234.5), FieldType::Currency, &opts(), false);
        assert_eq!(r, Rendered::Text("-1,234.50".to_string()));
    }

    #[test]
    fn test_currency_non_numeric_is_empty() {
        let r = format_value(&json!("n/a"), FieldType::Currency, &opts(), false);
        assert!(r.is_empty());
    }

    #[test]
    fn test_number_no_decimals_no_symbol() {
        let r = format_value(&json!(1234567), FieldType::Number, &opts(), false);
        assert_eq!(r, Rendered::Text("1,234,567".to_string()));
    }

    #[test]
    fn test_ssn_formats_nine_digits() {
        for input in [json!("123-45-6789"), json!(123456789), json!("123 45 6789")] {
            let r = format_value(&input, FieldType::Ssn, &opts(), false);
            assert_eq!(r, Rendered::Text("123-45-6789".to_string()), "input {input}");
        }
    }

    #[test]
    fn test_ssn_partial_passes_through() {
        let r = format_value(&json!("12-34"), FieldType::Ssn, &opts(), false);
        assert_eq!(r, Rendered::Text("1234".to_string()));
    }

    #[test]
    fn test_ein_formats() {
        let r = format_value(&json!("12-3456789"), FieldType::Ein, &opts(), false);
        assert_eq!(r, Rendered::Text("12-3456789".to_string()));
        let r = format_value(&json!(987654321), FieldType::Ein, &opts(), false);
        assert_eq!(r, Rendered::Text("98-7654321".to_string()));
    }

    #[test]
    fn test_date_default_pattern() {
        let r = format_value(&json!("2024-04-15"), FieldType::Date, &opts(), false);
        assert_eq!(r, Rendered::Text("04/15/2024".to_string()));
    }

    #[test]
    fn test_date_custom_pattern() {
        let options = FormatOptions {
            date_pattern: Some("YYYY-MM-DD".to_string()),
            ..Default::default()
        };
        let r = format_value(&json!("04/15/2024"), FieldType::Date, &options, false);
        assert_eq!(r, Rendered::Text("2024-04-15".to_string()));
    }

    #[test]
    fn test_date_unparseable_passes_through() {
        let r = format_value(&json!("sometime in spring"), FieldType::Date, &opts(), false);
        assert_eq!(r, Rendered::Text("sometime in spring".to_string()));
    }

    #[test]
    fn test_checkbox_coercion() {
        assert_eq!(format_value(&json!(true), FieldType::Checkbox, &opts(), false), Rendered::Check(true));
        assert_eq!(format_value(&json!(false), FieldType::Checkbox, &opts(), false), Rendered::Check(false));
        assert_eq!(format_value(&json!(0), FieldType::Checkbox, &opts(), false), Rendered::Check(false));
        assert_eq!(format_value(&json!(""), FieldType::Checkbox, &opts(), false), Rendered::Check(false));
        assert_eq!(format_value(&json!("yes"), FieldType::Checkbox, &opts(), false), Rendered::Check(true));
        assert_eq!(format_value(&json!(null), FieldType::Checkbox, &opts(), false), Rendered::Check(false));
    }

    #[test]
    fn test_text_null_is_empty() {
        let r = format_value(&json!(null), FieldType::Text, &opts(), false);
        assert!(r.is_empty());
    }
}
