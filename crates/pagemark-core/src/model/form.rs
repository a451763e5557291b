//! Interactive form field definitions.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The input type of a form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormFieldKind {
    Text,
    Checkbox,
    Dropdown,
    Radio,
    Signature,
}

/// A form field placed on a page, persisted alongside annotations.
///
/// Created through a configuration flow outside the core: the drawing
/// gesture only yields the page and normalized rectangle, the host fills
/// in label/options before committing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormField {
    pub id: Uuid,
    pub kind: FormFieldKind,
    /// 1-based page number.
    pub page: u32,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Choices for dropdown/radio kinds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub required: bool,
}

impl FormField {
    pub fn new(kind: FormFieldKind, page: u32, x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            page,
            x,
            y,
            width,
            height,
            label: None,
            options: None,
            required: false,
        }
    }
}
