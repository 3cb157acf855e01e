//! Storage module for record persistence
//!
//! This module defines the document store the auth state is persisted into,
//! and ships two backends:
//! - **Memory store** - For tests and ephemeral sessions
//! - **Local filesystem store** - One file per record (requires the `fs` feature)
//!
//! Any external collection (a database table, a document database, a remote
//! KV service) plugs in by implementing [`DocumentStore`]: find a record by
//! id, upsert a record, delete a record.
//!
//! # Examples
//!
//! ```rust
//! use signal_auth_store::storage::{DocumentStore, MemoryDocumentStore};
//!
//! # tokio_test::block_on(async {
//! let store = MemoryDocumentStore::new();
//! store.upsert("creds", "{}".to_string()).await?;
//! assert_eq!(store.find_one("creds").await?.map(|r| r.data), Some("{}".to_string()));
//! store.delete("creds").await?;
//! assert!(store.find_one("creds").await?.is_none());
//! # Ok::<(), signal_auth_store::error::StorageError>(())
//! # }).unwrap();
//! ```

pub mod adapter;
pub mod memory_adapter;

#[cfg(feature = "fs")]
pub mod storage_local;

// Re-export main types for convenience
pub use adapter::{DocumentRecord, DocumentStore};
pub use memory_adapter::MemoryDocumentStore;

#[cfg(feature = "fs")]
pub use storage_local::{LocalConfig, LocalDocumentStore};
