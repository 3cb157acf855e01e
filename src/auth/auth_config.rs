//! Auth state configuration

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;

use super::diagnostics::{DiagnosticsSink, NoopSink};

/// Options for [`AuthStateHandle::open`](super::AuthStateHandle::open)
#[derive(Clone)]
pub struct AuthStateConfig {
    /// Observer notified before each store access
    pub diagnostics: Arc<dyn DiagnosticsSink>,
    /// Upper bound on in-flight store operations per batch; `None` launches
    /// the whole batch at once
    pub max_concurrency: Option<NonZeroUsize>,
}

impl Default for AuthStateConfig {
    fn default() -> Self {
        Self {
            diagnostics: Arc::new(NoopSink),
            max_concurrency: None,
        }
    }
}

impl AuthStateConfig {
    /// Configuration with a no-op sink and unbounded batches
    pub fn new() -> Self {
        Self::default()
    }

    /// Use `sink` for diagnostics
    pub fn with_diagnostics(mut self, sink: impl DiagnosticsSink + 'static) -> Self {
        self.diagnostics = Arc::new(sink);
        self
    }

    /// Use an already shared sink for diagnostics
    pub fn with_shared_diagnostics(mut self, sink: Arc<dyn DiagnosticsSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Cap the number of concurrent store operations in a batch
    pub fn with_max_concurrency(mut self, limit: NonZeroUsize) -> Self {
        self.max_concurrency = Some(limit);
        self
    }
}

impl fmt::Debug for AuthStateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthStateConfig")
            .field("max_concurrency", &self.max_concurrency)
            .finish_non_exhaustive()
    }
}
