//! Memory document store

use crate::error::{StorageError, StorageResult};
use crate::storage::adapter::{DocumentRecord, DocumentStore};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory document store.
///
/// Clones share the same collection, which makes it easy to reopen auth
/// state against "the same database" in tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    data: Arc<RwLock<HashMap<String, String>>>,
}

impl MemoryDocumentStore {
    /// Create an empty memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw payload stored under `id`
    pub fn raw(&self, id: &str) -> StorageResult<Option<String>> {
        Ok(self
            .data
            .read()
            .map_err(|e| StorageError::Lock {
                reason: e.to_string(),
            })?
            .get(id)
            .cloned())
    }

    /// Sorted identifiers of every stored record
    pub fn ids(&self) -> StorageResult<Vec<String>> {
        let mut ids: Vec<String> = self
            .data
            .read()
            .map_err(|e| StorageError::Lock {
                reason: e.to_string(),
            })?
            .keys()
            .cloned()
            .collect();
        ids.sort();
        Ok(ids)
    }

    /// Number of stored records
    pub fn len(&self) -> StorageResult<usize> {
        Ok(self
            .data
            .read()
            .map_err(|e| StorageError::Lock {
                reason: e.to_string(),
            })?
            .len())
    }

    /// Whether the store holds no records
    pub fn is_empty(&self) -> StorageResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl DocumentStore for MemoryDocumentStore {
    async fn find_one(&self, id: &str) -> StorageResult<Option<DocumentRecord>> {
        Ok(self
            .raw(id)?
            .map(|data| DocumentRecord::new(id, data)))
    }

    async fn upsert(&self, id: &str, data: String) -> StorageResult<()> {
        self.data
            .write()
            .map_err(|e| StorageError::Lock {
                reason: e.to_string(),
            })?
            .insert(id.to_string(), data);
        Ok(())
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        self.data
            .write()
            .map_err(|e| StorageError::Lock {
                reason: e.to_string(),
            })?
            .remove(id);
        Ok(())
    }
}
