//! Encoded record access shared by the key store and the credentials handle

use futures::future;
use futures::{stream, StreamExt};
use std::future::Future;
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::diagnostics::{DiagnosticsSink, StoreEvent, StoreOperation};
use crate::error::Result;
use crate::serializer::{buffer_json, Value};
use crate::storage::DocumentStore;

pub(crate) struct Records<S> {
    store: S,
    diagnostics: Arc<dyn DiagnosticsSink>,
    max_concurrency: Option<NonZeroUsize>,
}

impl<S> Records<S> {
    pub(crate) fn new(
        store: S,
        diagnostics: Arc<dyn DiagnosticsSink>,
        max_concurrency: Option<NonZeroUsize>,
    ) -> Self {
        Self {
            store,
            diagnostics,
            max_concurrency,
        }
    }

    pub(crate) fn store(&self) -> &S {
        &self.store
    }

    pub(crate) fn report(&self, event: StoreEvent<'_>) {
        self.diagnostics.record(&event);
    }
}

impl<S: DocumentStore> Records<S> {
    /// Decoded value under `id`; a missing record and a stored `null` are both `None`.
    pub(crate) async fn read(&self, id: &str) -> Result<Option<Value>> {
        self.report(StoreEvent::new(StoreOperation::Read, &[id]));
        tracing::trace!(id, "reading data");

        let Some(record) = self.store.find_one(id).await? else {
            return Ok(None);
        };
        let value = buffer_json::decode(&record.data)?;
        Ok((!value.is_null()).then_some(value))
    }

    pub(crate) async fn write(&self, id: &str, value: &Value) -> Result<()> {
        let data = buffer_json::encode(value)?;
        self.report(StoreEvent::new(StoreOperation::Write, &[id]));
        tracing::trace!(id, bytes = data.len(), "writing data");

        self.store.upsert(id, data).await?;
        Ok(())
    }

    pub(crate) async fn remove(&self, id: &str) -> Result<()> {
        self.report(StoreEvent::new(StoreOperation::Remove, &[id]));
        tracing::trace!(id, "removing data");

        self.store.delete(id).await?;
        Ok(())
    }

    /// Drive every task to completion, `max_concurrency` at a time, then
    /// return the first failure in task order.
    ///
    /// Tasks are never dropped mid-flight: when one fails, the others still
    /// settle, and those that succeeded stay applied.
    pub(crate) async fn run_all<T, F, I>(&self, tasks: I) -> Result<Vec<T>>
    where
        I: IntoIterator<Item = F>,
        F: Future<Output = Result<T>>,
    {
        let settled: Vec<Result<T>> = match self.max_concurrency {
            None => future::join_all(tasks).await,
            Some(limit) => {
                stream::iter(tasks)
                    .buffered(limit.get())
                    .collect::<Vec<_>>()
                    .await
            }
        };
        settled.into_iter().collect()
    }
}
