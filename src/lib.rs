//! # Signal Auth Store
//!
//! Persistence for the authentication state of a messaging-protocol client:
//! the long-term credentials plus a growing set of keyed cryptographic
//! records, stored in any external document collection addressed by a unique
//! string id.
//!
//! ## Features
//!
//! - **Auth Module**: Load-or-generate credentials, batched concurrent key access
//! - **Serializer Module**: BufferJSON record format with lossless binary payloads
//! - **Storage Module**: Pluggable document stores including memory and filesystem backends
//!
//! ## Optional Features
//!
//! - `fs`: Local filesystem document store (enabled by default)
//!
//! ## Example
//!
//! ```rust
//! use signal_auth_store::prelude::*;
//! use signal_auth_store::serializer::Value;
//!
//! # tokio_test::block_on(async {
//! let store = MemoryDocumentStore::new();
//! let handle = AuthStateHandle::open(store, || Value::from("fresh"), AuthStateConfig::default()).await?;
//! assert_eq!(handle.creds(), &Value::from("fresh"));
//! # Ok::<(), Error>(())
//! # }).unwrap();
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![warn(clippy::all)]

// Re-export core error types
pub use error::{Error, Result};

// Core modules
pub mod auth;
pub mod error;
pub mod serializer;
pub mod storage;
pub mod telemetry;

// Utility modules
mod utils;

pub use utils::record_id;

// Re-export commonly used types
pub mod prelude {
    //! Common types and traits for convenient importing

    pub use crate::auth::{
        AuthState, AuthStateConfig, AuthStateHandle, KeyCategory, SignalDataSet, SignalKeyStore,
        SignalValue,
    };
    pub use crate::error::{Error, Result, SerializerError, StorageError};
    pub use crate::serializer::{Buffer, Value};
    pub use crate::storage::{DocumentRecord, DocumentStore, MemoryDocumentStore};
}

// Version information
/// The version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// The name of this crate
pub const CRATE_NAME: &str = env!("CARGO_PKG_NAME");
