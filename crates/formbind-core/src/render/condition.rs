//! Field activation conditions
//!
//! A condition is a single comparison `<path> <operator> <literal>`
//! gating whether a field is rendered at all. The expression is parsed
//! once at annotation-compile time into an operator enum and operand
//! pair; evaluation resolves the path operand through the shared path
//! resolver and compares values without coercion beyond the literal
//! parsing below.
//!
//! An absent expression is always active. A malformed expression is
//! also always active: a field with an unparseable condition must
//! never be silently dropped.
//!
//! Copyright (c) 2025 Formbind Team
//! Licensed under the Apache-2.0 license

use crate::render::path::PathExpr;
use serde_json::Value;

/// Comparison operators. Strict and loose spellings collapse to the
/// same semantics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
}

/// A compiled condition
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// No condition, or one that failed to parse: field is active
    Always,
    /// Single comparison between a resolved path and a literal
    Compare {
        path: PathExpr,
        op: CompareOp,
        literal: Value,
    },
}

/// Operator spellings, longest first so `!==` wins over `!=`
const OPERATORS: &[(&str, CompareOp)] = &[
    ("!==", CompareOp::Ne),
    ("===", CompareOp::Eq),
    ("!=", CompareOp::Ne),
    ("==", CompareOp::Eq),
];

impl Condition {
    /// Parse a condition expression. Anything that does not match the
    /// `<path> <operator> <literal>` grammar degrades to `Always`.
    pub fn parse(expression: &str) -> Self {
        let expression = expression.trim();

        for (token, op) in OPERATORS {
            let Some(pos) = expression.find(token) else {
                continue;
            };
            let lhs = expression[..pos].trim();
            let rhs = expression[pos + token.len()..].trim();
            if lhs.is_empty() || rhs.is_empty() {
                return Condition::Always;
            }
            let Ok(path) = PathExpr::parse(lhs) else {
                return Condition::Always;
            };
            return Condition::Compare {
                path,
                op: *op,
                literal: parse_literal(rhs),
            };
        }

        Condition::Always
    }

    pub fn is_always(&self) -> bool {
        matches!(self, Condition::Always)
    }

    /// Evaluate against a data document.
    ///
    /// An absent path operand compares unequal to every literal, so
    /// `==` is false and `!=` is true. A present-but-null operand is
    /// not absent: it compares equal to the `null` literal.
    pub fn evaluate(&self, data: &Value) -> bool {
        match self {
            Condition::Always => true,
            Condition::Compare { path, op, literal } => {
                let resolved = path.lookup(data);
                let equal = match &resolved {
                    Some(value) => values_equal(value, literal),
                    None => false,
                };
                match op {
                    CompareOp::Eq => equal,
                    CompareOp::Ne => !equal,
                }
            }
        }
    }
}

/// Parse the literal operand: barewords true/false/null, numbers, and
/// otherwise an unquoted string.
fn parse_literal(token: &str) -> Value {
    match token {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(n) = token.parse::<f64>() {
                Value::from(n)
            } else {
                Value::String(token.to_string())
            }
        }
    }
}

/// Value equality with numeric comparison across integer/float
/// representations; no other coercion.
fn values_equal(a: &Value, b: &Value) -> bool {
    match (a.as_f64(), b.as_f64()) {
        (Some(x), Some(y)) if a.is_number() && b.is_number() => x == y,
        _ => a == b,
    }
}
