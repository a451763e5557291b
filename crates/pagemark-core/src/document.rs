//! Document state controller.
//!
//! `DocumentController` owns every piece of mutable document state: pages,
//! annotations, threads, redactions, form fields, selection, history and
//! the dirty flag. Hosts drive it through direct methods or the `Command`
//! interface and read state back; it has no dependency on any UI layer.

use crate::history::{History, Snapshot};
use crate::model::{
    Annotation, AnnotationId, AnnotationThread, Comment, FormField, RedactionArea,
};
use crate::viewport::{MAX_ZOOM, MIN_ZOOM, ZOOM_STEP};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Size and orientation of one page, in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageInfo {
    /// 1-based page number.
    pub page: u32,
    pub width: f64,
    pub height: f64,
    /// Clockwise rotation, one of 0/90/180/270.
    pub rotation: i32,
}

/// Errors from page-level document mutation.
#[derive(Debug, Error)]
pub enum PageOpError {
    #[error("failed to parse document: {0}")]
    Parse(String),
    #[error("page {0} does not exist")]
    InvalidPage(u32),
    #[error("cannot delete the only page")]
    LastPage,
    #[error("page order is not a permutation of the document's pages")]
    InvalidOrder,
    #[error("no document loaded")]
    NoDocument,
    #[error("{0}")]
    Backend(String),
}

/// Byte-level page operations, implemented by the PDF crate.
///
/// Every method takes the current document bytes and returns new bytes;
/// implementations never mutate shared state, so a failed call leaves the
/// controller's copy intact.
pub trait PageBackend {
    fn open(&self, bytes: &[u8]) -> Result<Vec<PageInfo>, PageOpError>;
    fn rotate_page(&self, bytes: &[u8], page: u32, by_degrees: i32)
        -> Result<Vec<u8>, PageOpError>;
    fn delete_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError>;
    fn extract_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError>;
    fn reorder_pages(&self, bytes: &[u8], order: &[u32]) -> Result<Vec<u8>, PageOpError>;
    fn merge(&self, bytes: &[u8], other: &[u8]) -> Result<Vec<u8>, PageOpError>;
}

/// Everything the host persists for a document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SavePayload {
    pub annotations: Vec<Annotation>,
    pub threads: Vec<AnnotationThread>,
    pub redactions: Vec<RedactionArea>,
    pub form_fields: Vec<FormField>,
    /// Included only when a page operation changed the document bytes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_bytes: Option<Vec<u8>>,
}

pub struct DocumentController {
    backend: Box<dyn PageBackend>,
    pdf_bytes: Vec<u8>,
    pages: Vec<PageInfo>,
    /// Set when a page operation rewrote the bytes since the last save.
    bytes_changed: bool,
    current_page: u32,
    zoom: f64,
    annotations: Vec<Annotation>,
    threads: Vec<AnnotationThread>,
    redactions: Vec<RedactionArea>,
    form_fields: Vec<FormField>,
    selected: Option<AnnotationId>,
    history: History,
    error: Option<String>,
    dirty: bool,
}

impl DocumentController {
    pub fn new(backend: Box<dyn PageBackend>) -> Self {
        Self {
            backend,
            pdf_bytes: Vec::new(),
            pages: Vec::new(),
            bytes_changed: false,
            current_page: 1,
            zoom: 1.0,
            annotations: Vec::new(),
            threads: Vec::new(),
            redactions: Vec::new(),
            form_fields: Vec::new(),
            selected: None,
            history: History::new(Snapshot::default()),
            error: None,
            dirty: false,
        }
    }

    // --- accessors ---

    pub fn pages(&self) -> &[PageInfo] {
        &self.pages
    }

    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    pub fn threads(&self) -> &[AnnotationThread] {
        &self.threads
    }

    pub fn redactions(&self) -> &[RedactionArea] {
        &self.redactions
    }

    pub fn form_fields(&self) -> &[FormField] {
        &self.form_fields
    }

    pub fn selected(&self) -> Option<AnnotationId> {
        self.selected
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_loaded(&self) -> bool {
        !self.pages.is_empty()
    }

    pub fn pdf_bytes(&self) -> &[u8] {
        &self.pdf_bytes
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Annotations on one page, in insertion order.
    pub fn annotations_on_page(&self, page: u32) -> impl Iterator<Item = &Annotation> {
        self.annotations.iter().filter(move |a| a.page == page)
    }

    pub fn annotation(&self, id: AnnotationId) -> Option<&Annotation> {
        self.annotations.iter().find(|a| a.id == id)
    }

    // --- document lifecycle ---

    /// Load a document from raw bytes.
    ///
    /// On failure the previous document (if any) is left untouched and the
    /// error is recorded for the host to display.
    pub fn load_document(&mut self, bytes: Vec<u8>) -> Result<(), PageOpError> {
        let pages = match self.backend.open(&bytes) {
            Ok(pages) => pages,
            Err(e) => {
                log::error!("failed to load document: {e}");
                self.error = Some(e.to_string());
                return Err(e);
            }
        };
        self.pdf_bytes = bytes;
        self.pages = pages;
        self.bytes_changed = false;
        self.current_page = 1;
        self.annotations.clear();
        self.threads.clear();
        self.redactions.clear();
        self.form_fields.clear();
        self.selected = None;
        self.history = History::new(Snapshot::default());
        self.error = None;
        self.dirty = false;
        log::info!("loaded document with {} pages", self.pages.len());
        Ok(())
    }

    /// Restore previously saved annotation state onto the loaded document.
    pub fn restore(&mut self, payload: SavePayload) {
        self.annotations = payload.annotations;
        self.threads = payload.threads;
        self.redactions = payload.redactions;
        self.form_fields = payload.form_fields;
        self.selected = None;
        self.history = History::new(self.snapshot());
        self.dirty = false;
    }

    pub fn set_current_page(&mut self, page: u32) {
        if page >= 1 && page <= self.page_count() {
            self.current_page = page;
        }
    }

    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom / ZOOM_STEP);
    }

    pub fn zoom_reset(&mut self) {
        self.zoom = 1.0;
    }

    /// Build the payload the host persists.
    pub fn save_payload(&self) -> SavePayload {
        SavePayload {
            annotations: self.annotations.clone(),
            threads: self.threads.clone(),
            redactions: self.redactions.clone(),
            form_fields: self.form_fields.clone(),
            pdf_bytes: self.bytes_changed.then(|| self.pdf_bytes.clone()),
        }
    }

    /// Clear the dirty flag after a successful save.
    pub fn mark_saved(&mut self) {
        self.dirty = false;
        self.bytes_changed = false;
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            annotations: self.annotations.clone(),
            threads: self.threads.clone(),
            redactions: self.redactions.clone(),
            form_fields: self.form_fields.clone(),
        }
    }

    fn commit(&mut self) {
        let snap = self.snapshot();
        self.history.push(snap);
        self.dirty = true;
    }

    // --- annotations ---

    pub fn add_annotation(&mut self, annotation: Annotation) -> AnnotationId {
        let id = annotation.id;
        self.annotations.push(annotation);
        self.commit();
        id
    }

    /// Replace an annotation wholesale, stamping its modified time.
    /// Returns false when no annotation with that id exists.
    pub fn update_annotation(&mut self, mut annotation: Annotation) -> bool {
        let Some(slot) = self.annotations.iter_mut().find(|a| a.id == annotation.id) else {
            return false;
        };
        annotation.touch();
        *slot = annotation;
        self.commit();
        true
    }

    pub fn delete_annotation(&mut self, id: AnnotationId) -> bool {
        let before = self.annotations.len();
        self.annotations.retain(|a| a.id != id);
        if self.annotations.len() == before {
            return false;
        }
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.commit();
        true
    }

    pub fn select_annotation(&mut self, id: Option<AnnotationId>) {
        self.selected = id.filter(|id| self.annotations.iter().any(|a| a.id == *id));
    }

    // --- redactions and form fields ---

    pub fn add_redaction(&mut self, redaction: RedactionArea) {
        self.redactions.push(redaction);
        self.commit();
    }

    pub fn add_form_field(&mut self, field: FormField) -> Uuid {
        let id = field.id;
        self.form_fields.push(field);
        self.commit();
        id
    }

    pub fn delete_form_field(&mut self, id: Uuid) -> bool {
        let before = self.form_fields.len();
        self.form_fields.retain(|f| f.id != id);
        if self.form_fields.len() == before {
            return false;
        }
        self.commit();
        true
    }

    // --- threads ---

    pub fn add_thread(&mut self, thread: AnnotationThread) -> Uuid {
        let id = thread.id;
        self.threads.push(thread);
        self.commit();
        id
    }

    pub fn add_comment(&mut self, thread_id: Uuid, comment: Comment) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            return false;
        };
        thread.add_comment(comment);
        self.commit();
        true
    }

    pub fn edit_comment(&mut self, thread_id: Uuid, comment_id: Uuid, content: String) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            return false;
        };
        if !thread.edit_comment(comment_id, content) {
            return false;
        }
        self.commit();
        true
    }

    /// Delete a comment; a thread left empty is removed with it.
    pub fn delete_comment(&mut self, thread_id: Uuid, comment_id: Uuid) -> bool {
        let Some(idx) = self.threads.iter().position(|t| t.id == thread_id) else {
            return false;
        };
        let had = self.threads[idx].comments.iter().any(|c| c.id == comment_id);
        if !had {
            return false;
        }
        if self.threads[idx].delete_comment(comment_id) {
            self.threads.remove(idx);
        }
        self.commit();
        true
    }

    pub fn toggle_reaction(
        &mut self,
        thread_id: Uuid,
        comment_id: Uuid,
        emoji: &str,
        user: &str,
    ) -> bool {
        let Some(comment) = self
            .threads
            .iter_mut()
            .find(|t| t.id == thread_id)
            .and_then(|t| t.comments.iter_mut().find(|c| c.id == comment_id))
        else {
            return false;
        };
        comment.toggle_reaction(emoji, user);
        self.commit();
        true
    }

    pub fn resolve_thread(&mut self, thread_id: Uuid, by: &str) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            return false;
        };
        thread.resolve(by);
        self.commit();
        true
    }

    pub fn reopen_thread(&mut self, thread_id: Uuid) -> bool {
        let Some(thread) = self.threads.iter_mut().find(|t| t.id == thread_id) else {
            return false;
        };
        thread.reopen();
        self.commit();
        true
    }

    // --- history ---

    pub fn undo(&mut self) -> bool {
        let Some(snap) = self.history.undo() else {
            return false;
        };
        let snap = snap.clone();
        self.apply_snapshot(snap);
        true
    }

    pub fn redo(&mut self) -> bool {
        let Some(snap) = self.history.redo() else {
            return false;
        };
        let snap = snap.clone();
        self.apply_snapshot(snap);
        true
    }

    fn apply_snapshot(&mut self, snap: Snapshot) {
        self.annotations = snap.annotations;
        self.threads = snap.threads;
        self.redactions = snap.redactions;
        self.form_fields = snap.form_fields;
        if let Some(id) = self.selected {
            if !self.annotations.iter().any(|a| a.id == id) {
                self.selected = None;
            }
        }
        self.dirty = true;
    }

    // --- page operations ---

    fn require_loaded(&self) -> Result<(), PageOpError> {
        if self.is_loaded() {
            Ok(())
        } else {
            Err(PageOpError::NoDocument)
        }
    }

    fn record_error(&mut self, e: &PageOpError) {
        log::error!("page operation failed: {e}");
        self.error = Some(e.to_string());
    }

    /// Swap in new document bytes after a successful page operation.
    fn adopt_bytes(&mut self, bytes: Vec<u8>) -> Result<(), PageOpError> {
        let pages = match self.backend.open(&bytes) {
            Ok(pages) => pages,
            Err(e) => {
                self.record_error(&e);
                return Err(e);
            }
        };
        self.pdf_bytes = bytes;
        self.pages = pages;
        self.bytes_changed = true;
        self.dirty = true;
        Ok(())
    }

    /// Structural edits invalidate prior snapshots; history restarts from
    /// the remapped state.
    fn reset_history(&mut self) {
        let snap = self.snapshot();
        self.history.reset(snap);
    }

    pub fn rotate_current_page(&mut self, by_degrees: i32) -> Result<(), PageOpError> {
        self.require_loaded()?;
        let page = self.current_page;
        let bytes = self
            .backend
            .rotate_page(&self.pdf_bytes, page, by_degrees)
            .inspect_err(|e| self.record_error(e))?;
        self.adopt_bytes(bytes)?;
        self.error = None;
        Ok(())
    }

    /// Delete the current page. Content on it is dropped and every record
    /// on a later page is renumbered down by one; page numbers stay compact.
    pub fn delete_current_page(&mut self) -> Result<(), PageOpError> {
        self.require_loaded()?;
        let page = self.current_page;
        let bytes = self
            .backend
            .delete_page(&self.pdf_bytes, page)
            .inspect_err(|e| self.record_error(e))?;
        self.adopt_bytes(bytes)?;

        self.annotations.retain(|a| a.page != page);
        self.threads.retain(|t| t.page != page);
        self.redactions.retain(|r| r.page != page);
        self.form_fields.retain(|f| f.page != page);
        let shift = |p: &mut u32| {
            if *p > page {
                *p -= 1;
            }
        };
        self.annotations.iter_mut().for_each(|a| shift(&mut a.page));
        self.threads.iter_mut().for_each(|t| shift(&mut t.page));
        self.redactions.iter_mut().for_each(|r| shift(&mut r.page));
        self.form_fields.iter_mut().for_each(|f| shift(&mut f.page));

        if let Some(id) = self.selected {
            if !self.annotations.iter().any(|a| a.id == id) {
                self.selected = None;
            }
        }
        self.current_page = page.min(self.page_count());
        self.reset_history();
        self.error = None;
        Ok(())
    }

    /// Produce a single-page document from the current page. The loaded
    /// document is not modified.
    pub fn extract_current_page(&mut self) -> Result<Vec<u8>, PageOpError> {
        self.require_loaded()?;
        self.backend
            .extract_page(&self.pdf_bytes, self.current_page)
            .inspect_err(|e| self.record_error(e))
    }

    /// Reorder pages. `order` lists old page numbers in their new sequence,
    /// so `[3, 1, 2]` makes old page 3 the new page 1. Every record's page
    /// number follows its page to the new position.
    pub fn reorder_pages(&mut self, order: &[u32]) -> Result<(), PageOpError> {
        self.require_loaded()?;
        let bytes = self
            .backend
            .reorder_pages(&self.pdf_bytes, order)
            .inspect_err(|e| self.record_error(e))?;
        self.adopt_bytes(bytes)?;

        // old page number -> new page number
        let remap = |p: &mut u32| {
            if let Some(idx) = order.iter().position(|o| o == p) {
                *p = idx as u32 + 1;
            }
        };
        self.annotations.iter_mut().for_each(|a| remap(&mut a.page));
        self.threads.iter_mut().for_each(|t| remap(&mut t.page));
        self.redactions.iter_mut().for_each(|r| remap(&mut r.page));
        self.form_fields.iter_mut().for_each(|f| remap(&mut f.page));

        let mut current = self.current_page;
        remap(&mut current);
        self.current_page = current;
        self.reset_history();
        self.error = None;
        Ok(())
    }

    /// Append another document's pages after the current last page.
    /// Existing records keep their page numbers.
    pub fn merge_document(&mut self, other: &[u8]) -> Result<(), PageOpError> {
        self.require_loaded()?;
        let bytes = self
            .backend
            .merge(&self.pdf_bytes, other)
            .inspect_err(|e| self.record_error(e))?;
        self.adopt_bytes(bytes)?;
        self.reset_history();
        self.error = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AnnotationKind, Color};

    /// Backend over a fake byte format: the bytes are just the list of
    /// original page numbers, one byte per page.
    struct FakeBackend;

    impl PageBackend for FakeBackend {
        fn open(&self, bytes: &[u8]) -> Result<Vec<PageInfo>, PageOpError> {
            if bytes.is_empty() {
                return Err(PageOpError::Parse("empty".into()));
            }
            Ok((1..=bytes.len() as u32)
                .map(|page| PageInfo {
                    page,
                    width: 612.0,
                    height: 792.0,
                    rotation: 0,
                })
                .collect())
        }

        fn rotate_page(&self, bytes: &[u8], page: u32, _by: i32) -> Result<Vec<u8>, PageOpError> {
            if page as usize > bytes.len() {
                return Err(PageOpError::InvalidPage(page));
            }
            Ok(bytes.to_vec())
        }

        fn delete_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError> {
            if bytes.len() == 1 {
                return Err(PageOpError::LastPage);
            }
            let mut out = bytes.to_vec();
            out.remove(page as usize - 1);
            Ok(out)
        }

        fn extract_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError> {
            bytes
                .get(page as usize - 1)
                .map(|b| vec![*b])
                .ok_or(PageOpError::InvalidPage(page))
        }

        fn reorder_pages(&self, bytes: &[u8], order: &[u32]) -> Result<Vec<u8>, PageOpError> {
            if order.len() != bytes.len() {
                return Err(PageOpError::InvalidOrder);
            }
            order
                .iter()
                .map(|&p| {
                    bytes
                        .get(p as usize - 1)
                        .copied()
                        .ok_or(PageOpError::InvalidOrder)
                })
                .collect()
        }

        fn merge(&self, bytes: &[u8], other: &[u8]) -> Result<Vec<u8>, PageOpError> {
            let mut out = bytes.to_vec();
            out.extend_from_slice(other);
            Ok(out)
        }
    }

    fn controller_with_pages(n: u8) -> DocumentController {
        let mut ctl = DocumentController::new(Box::new(FakeBackend));
        ctl.load_document((1..=n).collect()).unwrap();
        ctl
    }

    fn ann_on(page: u32) -> Annotation {
        Annotation::new(AnnotationKind::Rectangle, page, 0.1, 0.1).with_size(0.2, 0.2)
    }

    #[test]
    fn test_load_failure_keeps_previous_document() {
        let mut ctl = controller_with_pages(3);
        ctl.add_annotation(ann_on(1));
        assert!(ctl.load_document(Vec::new()).is_err());
        assert_eq!(ctl.page_count(), 3);
        assert_eq!(ctl.annotations().len(), 1);
        assert!(ctl.error().is_some());
    }

    #[test]
    fn test_add_undo_redo_roundtrip() {
        let mut ctl = controller_with_pages(1);
        let id = ctl.add_annotation(ann_on(1));
        assert_eq!(ctl.annotations().len(), 1);
        assert!(ctl.undo());
        assert_eq!(ctl.annotations().len(), 0);
        assert!(ctl.redo());
        assert_eq!(ctl.annotations().len(), 1);
        assert_eq!(ctl.annotations()[0].id, id);
        assert!(!ctl.redo());
    }

    #[test]
    fn test_update_stamps_modified_time() {
        let mut ctl = controller_with_pages(1);
        let id = ctl.add_annotation(ann_on(1));
        let mut edited = ctl.annotation(id).unwrap().clone();
        edited.color = Color::from_hex("#ff0000");
        assert!(ctl.update_annotation(edited));
        let stored = ctl.annotation(id).unwrap();
        assert_eq!(stored.color, Color::from_hex("#ff0000"));
        assert!(stored.updated_at >= stored.created_at);
    }

    #[test]
    fn test_delete_selected_clears_selection() {
        let mut ctl = controller_with_pages(1);
        let id = ctl.add_annotation(ann_on(1));
        ctl.select_annotation(Some(id));
        assert_eq!(ctl.selected(), Some(id));
        assert!(ctl.delete_annotation(id));
        assert!(ctl.selected().is_none());
    }

    #[test]
    fn test_delete_page_remaps_records() {
        let mut ctl = controller_with_pages(3);
        let a1 = ctl.add_annotation(ann_on(1));
        let a2 = ctl.add_annotation(ann_on(2));
        let a3 = ctl.add_annotation(ann_on(3));
        ctl.set_current_page(2);
        ctl.delete_current_page().unwrap();

        assert_eq!(ctl.page_count(), 2);
        assert!(ctl.annotation(a2).is_none());
        assert_eq!(ctl.annotation(a1).unwrap().page, 1);
        assert_eq!(ctl.annotation(a3).unwrap().page, 2);
        assert!(ctl.is_dirty());
    }

    #[test]
    fn test_delete_last_remaining_page_refused() {
        let mut ctl = controller_with_pages(1);
        assert!(matches!(
            ctl.delete_current_page(),
            Err(PageOpError::LastPage)
        ));
        assert_eq!(ctl.page_count(), 1);
        assert!(ctl.error().is_some());
    }

    #[test]
    fn test_reorder_remaps_records() {
        let mut ctl = controller_with_pages(3);
        let a1 = ctl.add_annotation(ann_on(1));
        ctl.reorder_pages(&[3, 1, 2]).unwrap();
        assert_eq!(ctl.annotation(a1).unwrap().page, 2);
    }

    #[test]
    fn test_reorder_moves_current_page() {
        let mut ctl = controller_with_pages(3);
        ctl.set_current_page(3);
        ctl.reorder_pages(&[3, 1, 2]).unwrap();
        assert_eq!(ctl.current_page(), 1);
    }

    #[test]
    fn test_extract_does_not_modify_document() {
        let mut ctl = controller_with_pages(3);
        ctl.set_current_page(2);
        let bytes = ctl.extract_current_page().unwrap();
        assert_eq!(bytes, vec![2]);
        assert_eq!(ctl.page_count(), 3);
        assert!(!ctl.is_dirty());
    }

    #[test]
    fn test_merge_appends_pages() {
        let mut ctl = controller_with_pages(2);
        let a1 = ctl.add_annotation(ann_on(2));
        ctl.merge_document(&[9, 9]).unwrap();
        assert_eq!(ctl.page_count(), 4);
        assert_eq!(ctl.annotation(a1).unwrap().page, 2);
    }

    #[test]
    fn test_thread_comment_lifecycle() {
        let mut ctl = controller_with_pages(1);
        let tid = ctl.add_thread(AnnotationThread::new(1, 0.5, 0.5, Comment::new("a", "hi")));
        let c = Comment::new("b", "reply");
        let cid = c.id;
        assert!(ctl.add_comment(tid, c));
        assert!(ctl.delete_comment(tid, cid));
        assert_eq!(ctl.threads().len(), 1);

        let first = ctl.threads()[0].comments[0].id;
        assert!(ctl.delete_comment(tid, first));
        assert!(ctl.threads().is_empty());
    }

    #[test]
    fn test_merge_via_command() {
        let mut ctl = controller_with_pages(2);
        ctl.apply(crate::command::Command::MergeDocument { other: vec![9] })
            .unwrap();
        assert_eq!(ctl.page_count(), 3);
    }

    /// Backend whose rotate output cannot be reopened.
    struct CorruptingBackend;

    impl PageBackend for CorruptingBackend {
        fn open(&self, bytes: &[u8]) -> Result<Vec<PageInfo>, PageOpError> {
            FakeBackend.open(bytes)
        }

        fn rotate_page(&self, _bytes: &[u8], _page: u32, _by: i32) -> Result<Vec<u8>, PageOpError> {
            Ok(Vec::new())
        }

        fn delete_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError> {
            FakeBackend.delete_page(bytes, page)
        }

        fn extract_page(&self, bytes: &[u8], page: u32) -> Result<Vec<u8>, PageOpError> {
            FakeBackend.extract_page(bytes, page)
        }

        fn reorder_pages(&self, bytes: &[u8], order: &[u32]) -> Result<Vec<u8>, PageOpError> {
            FakeBackend.reorder_pages(bytes, order)
        }

        fn merge(&self, bytes: &[u8], other: &[u8]) -> Result<Vec<u8>, PageOpError> {
            FakeBackend.merge(bytes, other)
        }
    }

    #[test]
    fn test_reopen_failure_records_error() {
        let mut ctl = DocumentController::new(Box::new(CorruptingBackend));
        ctl.load_document(vec![1, 2]).unwrap();
        assert!(ctl.rotate_current_page(90).is_err());
        assert!(ctl.error().is_some());
        // The previous bytes stay in place.
        assert_eq!(ctl.page_count(), 2);
    }

    #[test]
    fn test_page_op_error_leaves_state() {
        let mut ctl = controller_with_pages(2);
        ctl.add_annotation(ann_on(1));
        assert!(ctl.reorder_pages(&[1]).is_err());
        assert_eq!(ctl.page_count(), 2);
        assert_eq!(ctl.annotations().len(), 1);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut ctl = controller_with_pages(1);
        for _ in 0..40 {
            ctl.zoom_in();
        }
        assert!(ctl.zoom() <= MAX_ZOOM);
        for _ in 0..80 {
            ctl.zoom_out();
        }
        assert!(ctl.zoom() >= MIN_ZOOM);
        ctl.zoom_reset();
        assert_eq!(ctl.zoom(), 1.0);
    }
}
