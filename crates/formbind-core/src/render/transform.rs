//! Named value transforms
//!
//! A transform is a pure function applied to a resolved value before
//! formatting. Unknown names are a deliberate no-op: annotations may
//! carry transforms a newer renderer understands, and an older one
//! must pass the value through rather than fail.
//!
//! Copyright (c) 2025 Formbind Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;

/// Apply a named transform to a value.
///
/// | name      | effect                                             |
/// |-----------|----------------------------------------------------|
/// | uppercase | uppercased string                                  |
/// | lowercase | lowercased string                                  |
/// | trim      | surrounding whitespace removed                     |
/// | sum       | sum of numeric(-string) sequence elements          |
/// | count     | sequence element count (0 for non-sequences)       |
/// | other     | value returned unchanged                           |
pub fn apply(value: Value, name: &str) -> Value {
    match name {
        "uppercase" => Value::String(stringify(&value).to_uppercase()),
        "lowercase" => Value::String(stringify(&value).to_lowercase()),
        "trim" => Value::String(stringify(&value).trim().to_string()),
        "sum" => sum(&value),
        "count" => count(&value),
        _ => value,
    }
}

/// Sum a sequence of numeric-or-numeric-string elements.
/// Non-numeric elements contribute 0; non-sequence input sums to 0.
fn sum(value: &Value) -> Value {
    let total: f64 = match value.as_array() {
        Some(elements) => elements.iter().filter_map(as_number).sum(),
        None => 0.0,
    };
    number_value(total)
}

fn count(value: &Value) -> Value {
    let n = value.as_array().map_or(0, |a| a.len());
    Value::from(n as u64)
}

/// Parse a value as a number: JSON numbers directly, strings leniently
/// (trimmed, thousands separators stripped).
pub(crate) fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

/// Render a scalar value as a string the way the annotation's origin
/// would: null becomes empty, numbers and booleans their canonical
/// text, compounds their JSON text.
pub(crate) fn stringify(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Build a JSON number, preferring an integer representation when the
/// value is whole (so `sum` over integers prints without a fraction).
fn number_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < (i64::MAX as f64) {
        Value::from(n as i64)
    } else {
        Value::from(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_case_transforms() {
        assert_eq!(apply(json!("John Doe"), "uppercase"), json!("JOHN DOE"));
        assert_eq!(apply(json!("John Doe"), "lowercase"), json!("john doe"));
        assert_eq!(apply(json!("  padded  "), "trim"), json!("padded"));
    }

    #[test]
    fn test_case_transforms_stringify() {
        assert_eq!(apply(json!(42), "uppercase"), json!("42"));
        assert_eq!(apply(json!(null), "trim"), json!(""));
    }

    #[test]
    fn test_sum_mixed_sequence() {
        assert_eq!(apply(json!([10, "20", null]), "sum"), json!(30));
        assert_eq!(apply(json!([1.5, "2.5"]), "sum"), json!(4));
        assert_eq!(apply(json!([1.25, 1.0]), "sum"), json!(2.25));
    }

    #[test]
    fn test_sum_strips_thousands_separators() {
        assert_eq!(apply(json!(["1,200", 300]), "sum"), json!(1500));
    }

    #[test]
    fn test_sum_non_sequence_is_zero() {
        assert_eq!(apply(json!("12"), "sum"), json!(0));
        assert_eq!(apply(json!({"a": 1}), "sum"), json!(0));
    }

    #[test]
    fn test_count() {
        assert_eq!(apply(json!([1, 2, 3]), "count"), json!(3));
        assert_eq!(apply(json!([]), "count"), json!(0));
        assert_eq!(apply(json!("abc"), "count"), json!(0));
    }

    #[test]
    fn test_unknown_name_passes_through() {
        assert_eq!(apply(json!("value"), "rot13"), json!("value"));
        assert_eq!(apply(json!([1]), ""), json!([1]));
    }
}
