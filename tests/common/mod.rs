//! Shared fixtures for the integration tests

#![allow(dead_code)]

use serde::{Deserialize, Serialize};
use signal_auth_store::auth::{DiagnosticsSink, StoreEvent, StoreOperation};
use signal_auth_store::error::{StorageError, StorageResult};
use signal_auth_store::serializer::Buffer;
use signal_auth_store::storage::{DocumentRecord, DocumentStore, MemoryDocumentStore};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Key pair as the protocol engine stores it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyPair {
    pub public: Buffer,
    pub private: Buffer,
}

impl KeyPair {
    pub fn random() -> Self {
        Self {
            public: Buffer::from(rand::random::<[u8; 32]>()),
            private: Buffer::from(rand::random::<[u8; 32]>()),
        }
    }
}

/// Signed pre-key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedKeyPair {
    pub key_pair: KeyPair,
    pub signature: Buffer,
    pub key_id: u32,
}

/// Credentials shaped like a real client's
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCreds {
    pub noise_key: KeyPair,
    pub signed_identity_key: KeyPair,
    pub signed_pre_key: SignedKeyPair,
    pub registration_id: u32,
    pub adv_secret_key: String,
    pub next_pre_key_id: u32,
    pub first_unuploaded_pre_key_id: u32,
    pub registered: bool,
    pub me: Option<String>,
}

pub fn generate_creds() -> TestCreds {
    TestCreds {
        noise_key: KeyPair::random(),
        signed_identity_key: KeyPair::random(),
        signed_pre_key: SignedKeyPair {
            key_pair: KeyPair::random(),
            signature: Buffer::from(rand::random::<[u8; 32]>()),
            key_id: 1,
        },
        registration_id: rand::random::<u32>() & 16383,
        adv_secret_key: "c2VjcmV0LWFkdi1rZXk=".to_string(),
        next_pre_key_id: 1,
        first_unuploaded_pre_key_id: 1,
        registered: false,
        me: None,
    }
}

/// Memory store that can fail chosen ids and tracks how many operations run at once
#[derive(Clone, Default)]
pub struct FlakyStore {
    pub inner: MemoryDocumentStore,
    failing: Arc<Mutex<HashSet<String>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_on(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn enter(&self, operation: &str, id: &str) -> StorageResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        // rejected ids fail at once, before any sibling operation gets to run
        if self.failing.lock().unwrap().contains(id) {
            return Err(StorageError::ConnectionError {
                reason: format!("{} {} rejected", operation, id),
            });
        }

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        // give every other launched operation a chance to start
        tokio::task::yield_now().await;

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        Ok(())
    }
}

impl DocumentStore for FlakyStore {
    async fn find_one(&self, id: &str) -> StorageResult<Option<DocumentRecord>> {
        self.enter("find_one", id).await?;
        self.inner.find_one(id).await
    }

    async fn upsert(&self, id: &str, data: String) -> StorageResult<()> {
        self.enter("upsert", id).await?;
        self.inner.upsert(id, data).await
    }

    async fn delete(&self, id: &str) -> StorageResult<()> {
        self.enter("delete", id).await?;
        self.inner.delete(id).await
    }
}

/// Sink that keeps every event
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<(StoreOperation, Vec<String>)>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<(StoreOperation, Vec<String>)> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, operation: StoreOperation) -> usize {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(op, _)| *op == operation)
            .count()
    }
}

impl DiagnosticsSink for RecordingSink {
    fn record(&self, event: &StoreEvent<'_>) {
        self.events.lock().unwrap().push((
            event.operation,
            event.ids.iter().map(|id| id.to_string()).collect(),
        ));
    }
}
