//! Debounced auto-save.
//!
//! Every mutation marks the document dirty and restarts the debounce
//! clock; the save fires once the document has been quiet for the
//! configured window, so rapid edits collapse into one write.

use crate::document::SavePayload;
use crate::storage::{Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default quiet period before an auto-save fires.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_MS: u64 = 1000;

/// Key for the "last opened" document, used for restore on startup.
pub const LAST_DOCUMENT_KEY: &str = "__last_document__";

pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    debounce: Duration,
    /// When the most recent mutation happened.
    last_change: Option<Instant>,
    dirty: bool,
    current_doc_id: Option<String>,
}

impl<S: Storage> AutoSaveManager<S> {
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            debounce: Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
            last_change: None,
            dirty: false,
            current_doc_id: None,
        }
    }

    pub fn set_debounce(&mut self, debounce: Duration) {
        self.debounce = debounce;
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    /// Record a mutation, restarting the debounce window.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
        self.last_change = Some(Instant::now());
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn set_document_id(&mut self, id: Option<String>) {
        self.current_doc_id = id;
    }

    pub fn document_id(&self) -> Option<&str> {
        self.current_doc_id.as_deref()
    }

    /// Whether the document is dirty and has been quiet long enough.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_change {
            Some(changed) => changed.elapsed() >= self.debounce,
            None => true,
        }
    }

    /// Save if the debounce window has elapsed. Returns true if a save
    /// was performed.
    pub async fn maybe_save(&mut self, payload: &SavePayload) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(payload).await?;
        Ok(true)
    }

    /// Save immediately, bypassing the debounce (explicit save shortcut).
    pub async fn save(&mut self, payload: &SavePayload) -> StorageResult<()> {
        let doc_id = self
            .current_doc_id
            .clone()
            .unwrap_or_else(|| "untitled".to_string());
        self.storage.save(&doc_id, payload).await?;
        // Also record as the last document for restore on startup.
        self.storage.save(LAST_DOCUMENT_KEY, payload).await?;
        self.dirty = false;
        self.last_change = None;
        log::debug!("saved document {doc_id}");
        Ok(())
    }

    pub async fn load(&mut self, id: &str) -> StorageResult<SavePayload> {
        let payload = self.storage.load(id).await?;
        self.current_doc_id = Some(id.to_string());
        self.dirty = false;
        self.last_change = None;
        Ok(payload)
    }

    /// Load the last opened document, if any was ever saved.
    pub async fn load_last(&mut self) -> Option<SavePayload> {
        match self.storage.load(LAST_DOCUMENT_KEY).await {
            Ok(payload) => {
                self.dirty = false;
                self.last_change = None;
                Some(payload)
            }
            Err(_) => None,
        }
    }

    pub async fn delete(&self, id: &str) -> StorageResult<()> {
        self.storage.delete(id).await
    }

    pub async fn list_documents(&self) -> StorageResult<Vec<String>> {
        let mut docs = self.storage.list().await?;
        docs.retain(|id| id != LAST_DOCUMENT_KEY);
        Ok(docs)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Single-future blocking executor for storage tests.
#[cfg(test)]
pub(crate) fn block_on<F: std::future::Future>(f: F) -> F::Output {
    use std::task::{Context, Poll, RawWaker, RawWakerVTable, Waker};

    fn dummy_raw_waker() -> RawWaker {
        fn no_op(_: *const ()) {}
        fn clone(_: *const ()) -> RawWaker {
            dummy_raw_waker()
        }
        static VTABLE: RawWakerVTable = RawWakerVTable::new(clone, no_op, no_op, no_op);
        RawWaker::new(std::ptr::null(), &VTABLE)
    }

    let waker = unsafe { Waker::from_raw(dummy_raw_waker()) };
    let mut cx = Context::from_waker(&waker);
    let mut f = std::pin::pin!(f);

    loop {
        match f.as_mut().poll(&mut cx) {
            Poll::Ready(result) => return result,
            Poll::Pending => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotation, AnnotationKind};
    use crate::storage::MemoryStorage;

    fn payload() -> SavePayload {
        SavePayload {
            annotations: vec![Annotation::new(AnnotationKind::Highlight, 1, 0.1, 0.1)],
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_manager_does_not_save() {
        let manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        assert!(!manager.is_dirty());
        assert!(!manager.should_save());
    }

    #[test]
    fn test_dirty_within_debounce_waits() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.set_debounce(Duration::from_secs(60));
        manager.mark_dirty();
        assert!(manager.is_dirty());
        assert!(!manager.should_save());
    }

    #[test]
    fn test_saves_after_quiet_period() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.set_debounce(Duration::ZERO);
        manager.set_document_id(Some("doc".to_string()));
        manager.mark_dirty();
        assert!(manager.should_save());

        let saved = block_on(manager.maybe_save(&payload())).unwrap();
        assert!(saved);
        assert!(!manager.is_dirty());
        assert!(block_on(manager.storage().exists("doc")).unwrap());
    }

    #[test]
    fn test_forced_save_bypasses_debounce() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.set_debounce(Duration::from_secs(60));
        manager.set_document_id(Some("doc".to_string()));
        manager.mark_dirty();

        block_on(manager.save(&payload())).unwrap();
        assert!(!manager.is_dirty());
    }

    #[test]
    fn test_load_last() {
        let storage = Arc::new(MemoryStorage::new());
        let mut manager = AutoSaveManager::new(storage.clone());
        manager.set_document_id(Some("doc".to_string()));
        block_on(manager.save(&payload())).unwrap();

        let mut manager2 = AutoSaveManager::new(storage);
        let restored = block_on(manager2.load_last()).unwrap();
        assert_eq!(restored.annotations.len(), 1);
    }

    #[test]
    fn test_list_excludes_last_document_key() {
        let mut manager = AutoSaveManager::new(Arc::new(MemoryStorage::new()));
        manager.set_document_id(Some("doc".to_string()));
        block_on(manager.save(&payload())).unwrap();
        let list = block_on(manager.list_documents()).unwrap();
        assert_eq!(list, vec!["doc".to_string()]);
    }
}
