//! Auth state persistence
//!
//! Maps a messaging client's auth state onto a [`DocumentStore`]:
//! - the credentials are one record under [`CREDS_ID`], loaded once when the
//!   handle is opened and written back only by [`AuthStateHandle::save_creds`]
//! - keyed records (pre-keys, sessions, sync keys, ...) are one record each
//!   under `"<category>-<id>"`, read and written on demand by
//!   [`SignalKeyStore`]
//!
//! # Examples
//!
//! ```rust
//! use serde::{Deserialize, Serialize};
//! use signal_auth_store::auth::{AuthStateConfig, AuthStateHandle, KeyCategory};
//! use signal_auth_store::serializer::{Buffer, Value};
//! use signal_auth_store::storage::MemoryDocumentStore;
//!
//! #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
//! struct Creds {
//!     identity_key: Buffer,
//!     registration_id: u32,
//! }
//!
//! # tokio_test::block_on(async {
//! let store = MemoryDocumentStore::new();
//! let generate = || Creds { identity_key: Buffer::from([7u8; 32]), registration_id: 42 };
//!
//! let mut handle = AuthStateHandle::open(store.clone(), generate, AuthStateConfig::default()).await?;
//! handle.creds_mut().registration_id = 43;
//! handle.save_creds().await?;
//!
//! handle.keys().set_one(KeyCategory::PreKey, "1", Some(Value::from(vec![1u8, 2]).into())).await?;
//! let found = handle.keys().get(KeyCategory::PreKey, &["1", "2"]).await?;
//! assert!(found["1"].is_some());
//! assert!(found["2"].is_none());
//!
//! let reopened = AuthStateHandle::open(store, generate, AuthStateConfig::default()).await?;
//! assert_eq!(reopened.creds().registration_id, 43);
//! # Ok::<(), signal_auth_store::Error>(())
//! # }).unwrap();
//! ```

pub mod auth_config;
pub mod auth_types;
pub mod diagnostics;
pub mod key_store;
mod records;

pub use auth_config::AuthStateConfig;
pub use auth_types::{
    AppStateSyncKeyData, AppStateSyncKeyFingerprint, KeyCategory, SignalDataMap, SignalDataSet,
    SignalValue,
};
pub use diagnostics::{DiagnosticsSink, NoopSink, StoreEvent, StoreOperation, TracingSink};
pub use key_store::SignalKeyStore;

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

use crate::error::Result;
use crate::serializer::buffer_json;
use crate::storage::DocumentStore;
use records::Records;

/// Record id of the credentials
pub const CREDS_ID: &str = "creds";

/// Credentials plus keyed records, as handed to the protocol engine
pub struct AuthState<S, C> {
    /// Long-term credentials, the in-memory source of truth
    pub creds: C,
    /// Keyed records, backed directly by the store
    pub keys: SignalKeyStore<S>,
}

/// Auth state bound to its store
pub struct AuthStateHandle<S, C> {
    /// The state the protocol engine works on
    pub state: AuthState<S, C>,
    records: Arc<Records<S>>,
}

impl<S, C> AuthStateHandle<S, C>
where
    S: DocumentStore,
    C: Serialize + DeserializeOwned,
{
    /// Load the auth state from `store`.
    ///
    /// Reads the credentials record; when there is none, `generate` provides
    /// fresh credentials. Nothing is written until [`save_creds`](Self::save_creds).
    ///
    /// # Errors
    ///
    /// Returns the store failure of the credentials read, or a decoding
    /// failure when the stored credentials do not match `C`.
    pub async fn open<G>(store: S, generate: G, config: AuthStateConfig) -> Result<Self>
    where
        G: FnOnce() -> C,
    {
        let records = Arc::new(Records::new(
            store,
            config.diagnostics,
            config.max_concurrency,
        ));

        let creds = match records.read(CREDS_ID).await? {
            Some(value) => buffer_json::from_value(value)?,
            None => {
                tracing::debug!("no stored credentials, generating fresh ones");
                generate()
            }
        };

        Ok(Self {
            state: AuthState {
                creds,
                keys: SignalKeyStore::new(Arc::clone(&records)),
            },
            records,
        })
    }

    /// Persist the in-memory credentials. Safe to repeat; the last write wins.
    ///
    /// # Errors
    ///
    /// Returns an encoding failure or the store failure of the upsert.
    pub async fn save_creds(&self) -> Result<()> {
        self.records
            .report(StoreEvent::new(StoreOperation::SaveCreds, &[CREDS_ID]));
        tracing::debug!("saving creds");

        let value = buffer_json::to_value(&self.state.creds)?;
        self.records.write(CREDS_ID, &value).await
    }

    /// Delete the stored credentials.
    ///
    /// The in-memory credentials are kept, so a later
    /// [`save_creds`](Self::save_creds) writes them back.
    ///
    /// # Errors
    ///
    /// Returns the store failure of the delete.
    pub async fn remove_creds(&self) -> Result<()> {
        self.records
            .report(StoreEvent::new(StoreOperation::RemoveCreds, &[CREDS_ID]));
        tracing::debug!("removing creds");

        self.records.remove(CREDS_ID).await
    }
}

impl<S, C> AuthStateHandle<S, C> {
    /// The in-memory credentials
    pub fn creds(&self) -> &C {
        &self.state.creds
    }

    /// Mutable access to the in-memory credentials
    pub fn creds_mut(&mut self) -> &mut C {
        &mut self.state.creds
    }

    /// The keyed record store
    pub fn keys(&self) -> &SignalKeyStore<S> {
        &self.state.keys
    }

    /// The backing document store
    pub fn store(&self) -> &S {
        self.records.store()
    }
}
