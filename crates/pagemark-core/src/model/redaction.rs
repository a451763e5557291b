//! Redaction areas.

use serde::{Deserialize, Serialize};

/// An opaque rectangle marking content for removal on export.
///
/// Coordinates are normalized (0-1) like annotations. Redactions have no
/// lifecycle beyond add and apply-at-export; they are never edited in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedactionArea {
    /// 1-based page number.
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RedactionArea {
    pub fn new(page: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            page,
            x,
            y,
            width,
            height,
            reason: None,
        }
    }

    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
