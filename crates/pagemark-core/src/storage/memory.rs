//! In-memory storage implementation.

use super::{BoxFuture, Storage, StorageError, StorageResult};
use crate::document::SavePayload;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
#[derive(Default)]
pub struct MemoryStorage {
    payloads: RwLock<HashMap<String, SavePayload>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, payload: &SavePayload) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        let payload = payload.clone();
        Box::pin(async move {
            let mut map = self
                .payloads
                .write()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            map.insert(id, payload);
            Ok(())
        })
    }

    fn load(&self, id: &str) -> BoxFuture<'_, StorageResult<SavePayload>> {
        let id = id.to_string();
        Box::pin(async move {
            let map = self
                .payloads
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            map.get(&id).cloned().ok_or(StorageError::NotFound(id))
        })
    }

    fn delete(&self, id: &str) -> BoxFuture<'_, StorageResult<()>> {
        let id = id.to_string();
        Box::pin(async move {
            let mut map = self
                .payloads
                .write()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            map.remove(&id);
            Ok(())
        })
    }

    fn list(&self) -> BoxFuture<'_, StorageResult<Vec<String>>> {
        Box::pin(async move {
            let map = self
                .payloads
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            Ok(map.keys().cloned().collect())
        })
    }

    fn exists(&self, id: &str) -> BoxFuture<'_, StorageResult<bool>> {
        let id = id.to_string();
        Box::pin(async move {
            let map = self
                .payloads
                .read()
                .map_err(|e| StorageError::Other(format!("lock error: {e}")))?;
            Ok(map.contains_key(&id))
        })
    }
}
