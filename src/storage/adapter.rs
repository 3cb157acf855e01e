//! Document store trait and record type

use crate::error::StorageResult;
use serde::{Deserialize, Serialize};
use std::future::Future;

/// One record of the backing collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    /// Unique identifier, the primary key
    pub id: String,
    /// Serialized payload
    pub data: String,
}

impl DocumentRecord {
    /// Create a new record
    pub fn new(id: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: data.into(),
        }
    }
}

/// Document store trait for different storage backends.
///
/// The store owns identifier uniqueness and any locking it needs; callers
/// may issue many operations on distinct identifiers concurrently.
pub trait DocumentStore: Send + Sync {
    /// Find the record stored under `id`
    fn find_one(&self, id: &str) -> impl Future<Output = StorageResult<Option<DocumentRecord>>> + Send;

    /// Insert or replace the record stored under `id`
    fn upsert(&self, id: &str, data: String) -> impl Future<Output = StorageResult<()>> + Send;

    /// Delete the record stored under `id`. Deleting a missing record succeeds.
    fn delete(&self, id: &str) -> impl Future<Output = StorageResult<()>> + Send;
}
