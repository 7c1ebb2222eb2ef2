//! Render result reporting
//!
//! All per-field outcomes are aggregated into a structured report that
//! is returned to the caller rather than logged as a side effect. The
//! report is the source of truth; tracing events exist only for
//! observability.
//!
//! Copyright (c) 2025 Formbind Team
//! Licensed under the Apache-2.0 license

use crate::Severity;
use serde::{Deserialize, Serialize};

/// Accumulated outcome of one render invocation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderReport {
    /// Fields successfully placed
    pub filled_count: u32,
    /// Fields that had no native identifier under native mode and
    /// were deferred to coordinate placement
    pub fallback_count: u32,
    /// Recoverable per-field errors (missing native field, type
    /// mismatch, missing page)
    pub error_count: u32,
    /// Fields skipped without error (inactive condition, empty value)
    pub skipped_count: u32,
    /// Per-field diagnostics in encounter order
    pub diagnostics: Vec<Diagnostic>,
}

/// One per-field note attached to the report
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub field_id: String,
    pub severity: Severity,
    pub message: String,
}

impl RenderReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_filled(&mut self) {
        self.filled_count += 1;
    }

    pub fn record_fallback(&mut self) {
        self.fallback_count += 1;
    }

    pub fn record_skipped(&mut self) {
        self.skipped_count += 1;
    }

    /// Record a recoverable per-field error
    pub fn record_error(&mut self, field_id: &str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(field = %field_id, %message, "field placement failed");
        self.error_count += 1;
        self.diagnostics.push(Diagnostic {
            field_id: field_id.to_string(),
            severity: Severity::Error,
            message,
        });
    }

    /// Whether every attempted field was placed cleanly
    pub fn is_clean(&self) -> bool {
        self.error_count == 0
    }
}
