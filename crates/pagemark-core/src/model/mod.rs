//! Data model: annotations, redactions, form fields and comment threads.

pub mod annotation;
pub mod color;
pub mod form;
pub mod redaction;
pub mod thread;

pub use annotation::{Annotation, AnnotationId, AnnotationKind, DEFAULT_HIT_EXTENT};
pub use color::Color;
pub use form::{FormField, FormFieldKind};
pub use redaction::RedactionArea;
pub use thread::{AnnotationThread, Comment};

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix milliseconds.
pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
