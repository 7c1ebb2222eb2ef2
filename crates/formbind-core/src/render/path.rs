//! Binding path parser and resolver
//!
//! Paths are dot-separated segments over an arbitrary nested data
//! document. A segment may carry a literal numeric index (`name[2]`)
//! or, at most once per path, the wildcard marker (`name[*]`) which
//! maps the remainder of the path over every element of the sequence
//! found at that point.
//!
//! Resolution is side-effect-free and never fails on missing data: an
//! absent or null intermediate short-circuits to "no value" so the
//! same expression can be evaluated repeatedly (binding and condition
//! both go through here).
//!
//! Copyright (c) 2025 Formbind Team
//! Licensed under the Apache-2.0 license

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Errors produced while parsing a binding path
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path")]
    Empty,

    #[error("empty segment at position {position}")]
    EmptySegment { position: usize },

    #[error("invalid index '{index}' in segment '{segment}'")]
    InvalidIndex { segment: String, index: String },

    #[error("unterminated bracket in segment '{segment}'")]
    UnterminatedBracket { segment: String },

    #[error("more than one wildcard segment (unsupported)")]
    MultipleWildcards,

    #[error("unexpected characters after bracket in segment '{segment}'")]
    TrailingCharacters { segment: String },
}

/// One step of a compiled path
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathStep {
    /// Descend into an object by key
    Key(String),
    /// Descend into a sequence at a literal position
    Index(usize),
    /// Map the remaining steps over every element of a sequence
    Wildcard,
}

/// A compiled binding path, parsed once at annotation-compile time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathExpr {
    steps: Vec<PathStep>,
}

impl PathExpr {
    /// Parse a dot-notation path into steps.
    ///
    /// At most one wildcard is allowed; more is rejected rather than
    /// given a guessed meaning.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(PathError::Empty);
        }

        let mut steps = Vec::new();
        let mut saw_wildcard = false;

        for (position, segment) in input.split('.').enumerate() {
            if segment.is_empty() {
                return Err(PathError::EmptySegment { position });
            }

            let (name, bracket) = match segment.find('[') {
                Some(open) => {
                    let close = segment.rfind(']').ok_or_else(|| PathError::UnterminatedBracket {
                        segment: segment.to_string(),
                    })?;
                    if close != segment.len() - 1 || close < open {
                        return Err(PathError::TrailingCharacters {
                            segment: segment.to_string(),
                        });
                    }
                    (&segment[..open], Some(&segment[open + 1..close]))
                }
                None => (segment, None),
            };

            if !name.is_empty() {
                steps.push(PathStep::Key(name.to_string()));
            } else if bracket.is_none() {
                return Err(PathError::EmptySegment { position });
            }

            if let Some(inner) = bracket {
                if inner == "*" {
                    if saw_wildcard {
                        return Err(PathError::MultipleWildcards);
                    }
                    saw_wildcard = true;
                    steps.push(PathStep::Wildcard);
                } else {
                    let index: usize =
                        inner.parse().map_err(|_| PathError::InvalidIndex {
                            segment: segment.to_string(),
                            index: inner.to_string(),
                        })?;
                    steps.push(PathStep::Index(index));
                }
            }
        }

        Ok(Self { steps })
    }

    /// Whether this path contains a wildcard step
    pub fn has_wildcard(&self) -> bool {
        self.steps.iter().any(|s| matches!(s, PathStep::Wildcard))
    }

    /// Resolve the path against a data document.
    ///
    /// Returns `None` when the value is absent or null; that is never
    /// an error, it means "use the fallback". A wildcard yields a
    /// sequence of per-element results, with `Value::Null` standing in
    /// for elements where the remainder of the path is absent.
    pub fn resolve(&self, data: &Value) -> Option<Value> {
        Self::walk(&self.steps, data).filter(|value| !value.is_null())
    }

    /// Resolve with a caller-supplied default for the missing case
    pub fn resolve_or<'a>(&self, data: &Value, default: &'a Value) -> Value {
        self.resolve(data).unwrap_or_else(|| default.clone())
    }

    /// Like [`resolve`](Self::resolve) but keeps an explicit `null`
    /// value. Condition evaluation needs the distinction: a key that is
    /// present and null compares equal to the `null` literal, while an
    /// absent key compares equal to nothing.
    pub fn lookup(&self, data: &Value) -> Option<Value> {
        Self::walk(&self.steps, data)
    }

    fn walk(steps: &[PathStep], data: &Value) -> Option<Value> {
        let mut current = data;

        for (i, step) in steps.iter().enumerate() {
            match step {
                PathStep::Key(key) => {
                    current = current.as_object()?.get(key)?;
                }
                PathStep::Index(index) => {
                    current = current.as_array()?.get(*index)?;
                }
                PathStep::Wildcard => {
                    let elements = current.as_array()?;
                    let remainder = &steps[i + 1..];
                    if remainder.is_empty() {
                        return Some(Value::Array(elements.clone()));
                    }
                    let mapped = elements
                        .iter()
                        .map(|element| Self::walk(remainder, element).unwrap_or(Value::Null))
                        .collect();
                    return Some(Value::Array(mapped));
                }
            }
        }

        Some(current.clone())
    }
}

impl fmt::Display for PathExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for step in &self.steps {
            match step {
                PathStep::Key(key) => {
                    if !first {
                        write!(f, ".")?;
                    }
                    write!(f, "{key}")?;
                }
                PathStep::Index(index) => write!(f, "[{index}]")?,
                PathStep::Wildcard => write!(f, "[*]")?,
            }
            first = false;
        }
        Ok(())
    }
}
