//! Message-passing interface over the document controller.
//!
//! Hosts that prefer dispatching over calling methods directly (worker
//! threads, script bindings, replay) build `Command` values and feed them
//! to [`DocumentController::apply`].

use crate::document::{DocumentController, PageOpError};
use crate::model::{Annotation, AnnotationId, AnnotationThread, Comment, FormField, RedactionArea};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Every mutating operation the controller supports.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    AddAnnotation { annotation: Annotation },
    UpdateAnnotation { annotation: Annotation },
    DeleteAnnotation { id: AnnotationId },
    SelectAnnotation { id: Option<AnnotationId> },
    AddRedaction { redaction: RedactionArea },
    AddFormField { field: FormField },
    DeleteFormField { id: Uuid },
    AddThread { thread: AnnotationThread },
    AddComment { thread_id: Uuid, comment: Comment },
    EditComment { thread_id: Uuid, comment_id: Uuid, content: String },
    DeleteComment { thread_id: Uuid, comment_id: Uuid },
    ToggleReaction { thread_id: Uuid, comment_id: Uuid, emoji: String, user: String },
    ResolveThread { thread_id: Uuid, by: String },
    ReopenThread { thread_id: Uuid },
    Undo,
    Redo,
    SetCurrentPage { page: u32 },
    SetZoom { zoom: f64 },
    RotateCurrentPage { by_degrees: i32 },
    DeleteCurrentPage,
    ReorderPages { order: Vec<u32> },
    MergeDocument { other: Vec<u8> },
}

impl DocumentController {
    /// Dispatch a command. Page operations report failure through the
    /// returned result and the controller's error state; everything else
    /// is a silent no-op when the target does not exist, matching the
    /// direct methods.
    pub fn apply(&mut self, command: Command) -> Result<(), PageOpError> {
        match command {
            Command::AddAnnotation { annotation } => {
                self.add_annotation(annotation);
            }
            Command::UpdateAnnotation { annotation } => {
                self.update_annotation(annotation);
            }
            Command::DeleteAnnotation { id } => {
                self.delete_annotation(id);
            }
            Command::SelectAnnotation { id } => self.select_annotation(id),
            Command::AddRedaction { redaction } => self.add_redaction(redaction),
            Command::AddFormField { field } => {
                self.add_form_field(field);
            }
            Command::DeleteFormField { id } => {
                self.delete_form_field(id);
            }
            Command::AddThread { thread } => {
                self.add_thread(thread);
            }
            Command::AddComment { thread_id, comment } => {
                self.add_comment(thread_id, comment);
            }
            Command::EditComment {
                thread_id,
                comment_id,
                content,
            } => {
                self.edit_comment(thread_id, comment_id, content);
            }
            Command::DeleteComment {
                thread_id,
                comment_id,
            } => {
                self.delete_comment(thread_id, comment_id);
            }
            Command::ToggleReaction {
                thread_id,
                comment_id,
                emoji,
                user,
            } => {
                self.toggle_reaction(thread_id, comment_id, &emoji, &user);
            }
            Command::ResolveThread { thread_id, by } => {
                self.resolve_thread(thread_id, &by);
            }
            Command::ReopenThread { thread_id } => {
                self.reopen_thread(thread_id);
            }
            Command::Undo => {
                self.undo();
            }
            Command::Redo => {
                self.redo();
            }
            Command::SetCurrentPage { page } => self.set_current_page(page),
            Command::SetZoom { zoom } => self.set_zoom(zoom),
            Command::RotateCurrentPage { by_degrees } => {
                return self.rotate_current_page(by_degrees);
            }
            Command::DeleteCurrentPage => return self.delete_current_page(),
            Command::ReorderPages { order } => return self.reorder_pages(&order),
            Command::MergeDocument { other } => return self.merge_document(&other),
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AnnotationKind;

    #[test]
    fn test_command_serde_roundtrip() {
        let cmd = Command::AddAnnotation {
            annotation: Annotation::new(AnnotationKind::Highlight, 1, 0.1, 0.1),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"add_annotation\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        assert!(matches!(back, Command::AddAnnotation { .. }));
    }

    #[test]
    fn test_merge_command_roundtrip() {
        let cmd = Command::MergeDocument {
            other: vec![1, 2, 3],
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert!(json.contains("\"type\":\"merge_document\""));
        let back: Command = serde_json::from_str(&json).unwrap();
        let Command::MergeDocument { other } = back else {
            panic!("wrong variant");
        };
        assert_eq!(other, vec![1, 2, 3]);
    }
}
