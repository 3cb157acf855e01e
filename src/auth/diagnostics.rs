//! Diagnostics hooks for store access
//!
//! A [`DiagnosticsSink`] sees every store access before it is issued. The
//! default sink does nothing; [`TracingSink`] forwards events to `tracing`.

use super::auth_types::KeyCategory;

/// Kind of access being reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    /// Single record read
    Read,
    /// Single record upsert
    Write,
    /// Single record delete
    Remove,
    /// Batched keyed read
    GetKeys,
    /// Batched keyed write/delete
    SetKeys,
    /// Credentials save
    SaveCreds,
    /// Credentials delete
    RemoveCreds,
}

impl StoreOperation {
    /// Short name used in log fields
    pub const fn as_str(self) -> &'static str {
        match self {
            StoreOperation::Read => "read",
            StoreOperation::Write => "write",
            StoreOperation::Remove => "remove",
            StoreOperation::GetKeys => "get_keys",
            StoreOperation::SetKeys => "set_keys",
            StoreOperation::SaveCreds => "save_creds",
            StoreOperation::RemoveCreds => "remove_creds",
        }
    }
}

/// One reported access
#[derive(Debug, Clone, Copy)]
pub struct StoreEvent<'a> {
    /// What is about to happen
    pub operation: StoreOperation,
    /// Category of a batched keyed read
    pub category: Option<KeyCategory>,
    /// Identifiers involved: record ids for single accesses and writes,
    /// caller ids for batched reads
    pub ids: &'a [&'a str],
}

impl<'a> StoreEvent<'a> {
    /// Event without a category
    pub fn new(operation: StoreOperation, ids: &'a [&'a str]) -> Self {
        Self {
            operation,
            category: None,
            ids,
        }
    }

    /// Attach a category
    pub fn with_category(mut self, category: KeyCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// Observer of store accesses.
///
/// Sinks must not block; they run inline with the access they describe.
pub trait DiagnosticsSink: Send + Sync {
    /// Called before the access described by `event`
    fn record(&self, event: &StoreEvent<'_>);
}

/// Sink that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSink;

impl DiagnosticsSink for NoopSink {
    fn record(&self, _event: &StoreEvent<'_>) {}
}

/// Sink that emits a `debug` event per access
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, event: &StoreEvent<'_>) {
        tracing::debug!(
            operation = event.operation.as_str(),
            category = event.category.map(KeyCategory::as_str),
            ids = ?event.ids,
            "auth store access"
        );
    }
}
