//! Batched access to keyed records
//!
//! Keyed records live under `"<category>-<id>"`. Nothing is cached: every
//! `get` and `set` goes to the store, one operation per id, all launched
//! together.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

use super::auth_types::{KeyCategory, SignalDataMap, SignalDataSet, SignalValue};
use super::diagnostics::{StoreEvent, StoreOperation};
use super::records::Records;
use crate::error::{Error, Result};
use crate::serializer::Value;
use crate::storage::DocumentStore;
use crate::utils;

/// Keyed half of the auth state
pub struct SignalKeyStore<S> {
    records: Arc<Records<S>>,
}

impl<S> Clone for SignalKeyStore<S> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<S: DocumentStore> SignalKeyStore<S> {
    pub(crate) fn new(records: Arc<Records<S>>) -> Self {
        Self { records }
    }

    /// Fetch the records of `category` for every id in `ids`.
    ///
    /// The result has an entry for each requested id; ids without a record
    /// map to `None`. `AppStateSyncKey` values come back rebuilt, every other
    /// category in plain form. Any failed read fails the whole call.
    ///
    /// # Errors
    ///
    /// Returns the first store or decoding failure among the reads.
    pub async fn get<K: AsRef<str>>(&self, category: KeyCategory, ids: &[K]) -> Result<SignalDataMap> {
        let ids: Vec<&str> = ids.iter().map(AsRef::as_ref).collect();
        self.records
            .report(StoreEvent::new(StoreOperation::GetKeys, &ids).with_category(category));
        tracing::debug!(category = category.as_str(), count = ids.len(), "getting keys");

        let reads = ids.iter().map(|id| async move {
            let stored = self
                .records
                .read(&utils::record_id(category.as_str(), id))
                .await?;
            let value = stored
                .map(|value| SignalValue::from_stored(category, value))
                .transpose()?;
            Ok::<_, Error>((id.to_string(), value))
        });

        let entries = self.records.run_all(reads).await?;
        Ok(entries.into_iter().collect::<HashMap<_, _>>())
    }

    /// Apply a batch of writes.
    ///
    /// Present values are upserted; `None` and falsy values delete the record.
    /// Every write is dispatched concurrently and runs to completion. When one
    /// fails the call fails, and the writes that succeeded are not rolled back.
    ///
    /// # Errors
    ///
    /// Returns an encoding failure before anything is written, otherwise the
    /// first store failure among the writes.
    pub async fn set(&self, data: &SignalDataSet) -> Result<()> {
        let mut writes: Vec<(String, Option<Cow<'_, Value>>)> = Vec::new();
        for (category, entries) in data {
            for (id, value) in entries {
                let value = match value {
                    Some(value) if !value.is_falsy() => Some(value.to_value()?),
                    _ => None,
                };
                writes.push((utils::record_id(category.as_str(), id), value));
            }
        }

        let ids: Vec<&str> = writes.iter().map(|(id, _)| id.as_str()).collect();
        self.records
            .report(StoreEvent::new(StoreOperation::SetKeys, &ids));
        tracing::debug!(
            count = writes.len(),
            deletes = writes.iter().filter(|(_, v)| v.is_none()).count(),
            "setting keys"
        );

        let tasks = writes.iter().map(|(id, value)| async move {
            match value {
                Some(value) => self.records.write(id, value).await,
                None => self.records.remove(id).await,
            }
        });
        self.records.run_all(tasks).await?;
        Ok(())
    }

    /// Convenience wrapper around [`get`](Self::get) for a single id
    ///
    /// # Errors
    ///
    /// Returns the store or decoding failure of the read.
    pub async fn get_one(&self, category: KeyCategory, id: &str) -> Result<Option<SignalValue>> {
        let mut found = self.get(category, &[id]).await?;
        Ok(found.remove(id).flatten())
    }

    /// Convenience wrapper around [`set`](Self::set) for a single id
    ///
    /// # Errors
    ///
    /// Returns the encoding or store failure of the write.
    pub async fn set_one(
        &self,
        category: KeyCategory,
        id: &str,
        value: Option<SignalValue>,
    ) -> Result<()> {
        let data = SignalDataSet::from([(category, SignalDataMap::from([(id.to_string(), value)]))]);
        self.set(&data).await
    }
}
