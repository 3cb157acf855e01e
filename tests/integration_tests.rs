//! Integration tests for the signal auth store

mod common;

use common::{generate_creds, FlakyStore, RecordingSink, TestCreds};
use signal_auth_store::auth::{
    AppStateSyncKeyData, AppStateSyncKeyFingerprint, AuthStateConfig, AuthStateHandle,
    KeyCategory, SignalDataMap, SignalDataSet, SignalValue, StoreOperation, CREDS_ID,
};
use signal_auth_store::error::{Error, StorageError};
use signal_auth_store::serializer::{Buffer, Value};
use signal_auth_store::storage::MemoryDocumentStore;
use std::num::NonZeroUsize;
use std::sync::Arc;

async fn open(store: MemoryDocumentStore) -> AuthStateHandle<MemoryDocumentStore, TestCreds> {
    AuthStateHandle::open(store, generate_creds, AuthStateConfig::default())
        .await
        .expect("Failed to open auth state")
}

fn session_blob(seed: u8) -> SignalValue {
    Value::object([
        ("record", Value::from(vec![seed; 16])),
        ("version", Value::from("v1")),
    ])
    .into()
}

#[test]
fn test_library_version() {
    assert!(!signal_auth_store::VERSION.is_empty());
    assert_eq!(signal_auth_store::CRATE_NAME, "signal-auth-store");
}

#[tokio::test]
async fn test_end_to_end_reopen() {
    signal_auth_store::telemetry::init_tracing();
    let store = MemoryDocumentStore::new();

    let first = open(store.clone()).await;
    let generated = first.creds().clone();
    assert_eq!(generated.noise_key.public.len(), 32);
    first.save_creds().await.expect("Failed to save creds");

    let second = open(store).await;
    assert_eq!(second.creds(), &generated);
}

#[tokio::test]
async fn test_absent_ids_are_reported() {
    let handle = open(MemoryDocumentStore::new()).await;

    handle
        .keys()
        .set_one(KeyCategory::PreKey, "1", Some(session_blob(1)))
        .await
        .unwrap();
    handle.keys().set_one(KeyCategory::PreKey, "1", None).await.unwrap();

    let found = handle
        .keys()
        .get(KeyCategory::PreKey, &["1", "never-written"])
        .await
        .unwrap();
    assert_eq!(found.len(), 2);
    assert_eq!(found.get("1"), Some(&None));
    assert_eq!(found.get("never-written"), Some(&None));
}

#[tokio::test]
async fn test_null_value_deletes_record() {
    let store = MemoryDocumentStore::new();
    let handle = open(store.clone()).await;

    handle
        .keys()
        .set_one(KeyCategory::Session, "alice.0", Some(session_blob(4)))
        .await
        .unwrap();
    assert!(store.raw("session-alice.0").unwrap().is_some());

    handle
        .keys()
        .set_one(KeyCategory::Session, "alice.0", Some(Value::Null.into()))
        .await
        .unwrap();
    assert!(store.raw("session-alice.0").unwrap().is_none());
    assert!(handle
        .keys()
        .get_one(KeyCategory::Session, "alice.0")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_categories_do_not_collide() {
    let store = MemoryDocumentStore::new();
    let handle = open(store.clone()).await;

    let data = SignalDataSet::from([
        (
            KeyCategory::PreKey,
            SignalDataMap::from([("1".to_string(), Some(session_blob(1)))]),
        ),
        (
            KeyCategory::Session,
            SignalDataMap::from([("1".to_string(), Some(session_blob(2)))]),
        ),
    ]);
    handle.keys().set(&data).await.unwrap();

    assert_eq!(store.ids().unwrap(), vec!["pre-key-1", "session-1"]);
    let pre_key = handle.keys().get(KeyCategory::PreKey, &["1"]).await.unwrap();
    let session = handle.keys().get(KeyCategory::Session, &["1"]).await.unwrap();
    assert_eq!(pre_key["1"], Some(session_blob(1)));
    assert_eq!(session["1"], Some(session_blob(2)));
}

#[tokio::test]
async fn test_app_state_sync_key_is_rebuilt() {
    let handle = open(MemoryDocumentStore::new()).await;
    let key = AppStateSyncKeyData {
        key_data: Some(Buffer::from(vec![0xaau8; 32])),
        fingerprint: Some(AppStateSyncKeyFingerprint {
            raw_id: Some(99),
            current_index: Some(3),
            device_indexes: vec![0, 2],
        }),
        timestamp: Some(1_690_000_000_000),
    };
    let plain = Value::object([("keyData", Value::from(vec![0xaau8; 32]))]);

    let data = SignalDataSet::from([
        (
            KeyCategory::AppStateSyncKey,
            SignalDataMap::from([("AAAAAGMT".to_string(), Some(key.clone().into()))]),
        ),
        (
            KeyCategory::AppStateSyncVersion,
            SignalDataMap::from([("regular".to_string(), Some(plain.clone().into()))]),
        ),
    ]);
    handle.keys().set(&data).await.unwrap();

    let sync_key = handle
        .keys()
        .get_one(KeyCategory::AppStateSyncKey, "AAAAAGMT")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(sync_key, SignalValue::AppStateSyncKey(key));

    let version = handle
        .keys()
        .get_one(KeyCategory::AppStateSyncVersion, "regular")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(version, SignalValue::Generic(plain));
}

#[tokio::test]
async fn test_binary_payloads_survive() {
    let handle = open(MemoryDocumentStore::new()).await;
    let payload: Vec<u8> = (0..=255).collect();
    let value = Value::object([
        ("raw", Value::from(payload.clone())),
        ("nested", Value::Array(vec![Value::from(Vec::<u8>::new()), Value::from(vec![0u8, 255])])),
    ]);

    handle
        .keys()
        .set_one(KeyCategory::SenderKey, "group::alice", Some(value.clone().into()))
        .await
        .unwrap();
    let back = handle
        .keys()
        .get_one(KeyCategory::SenderKey, "group::alice")
        .await
        .unwrap()
        .unwrap();
    let back = back.as_generic().unwrap();
    assert_eq!(back, &value);
    assert_eq!(&back.get("raw").and_then(Value::as_bytes).unwrap()[..], &payload[..]);
}

#[tokio::test]
async fn test_read_failure_fails_batch() {
    let store = FlakyStore::new();
    store.fail_on("session-2");
    let handle: AuthStateHandle<_, TestCreds> =
        AuthStateHandle::open(store.clone(), generate_creds, AuthStateConfig::default())
            .await
            .unwrap();

    let err = handle
        .keys()
        .get(KeyCategory::Session, &["1", "2", "3"])
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::Storage(StorageError::ConnectionError { ref reason }) if reason.contains("session-2")
    ));
}

#[tokio::test]
async fn test_write_failure_lets_other_writes_land() {
    let store = FlakyStore::new();
    store.fail_on("pre-key-1");
    let handle: AuthStateHandle<_, TestCreds> =
        AuthStateHandle::open(store.clone(), generate_creds, AuthStateConfig::default())
            .await
            .unwrap();

    let entries: SignalDataMap = (1..=5)
        .map(|i| (i.to_string(), Some(session_blob(i))))
        .collect();
    let result = handle
        .keys()
        .set(&SignalDataSet::from([(KeyCategory::PreKey, entries)]))
        .await;

    assert!(matches!(
        result,
        Err(Error::Storage(StorageError::ConnectionError { ref reason })) if reason.contains("pre-key-1")
    ));
    assert_eq!(
        store.inner.ids().unwrap(),
        vec!["pre-key-2", "pre-key-3", "pre-key-4", "pre-key-5"]
    );
}

#[tokio::test]
async fn test_bounded_write_failure_lets_other_writes_land() {
    let store = FlakyStore::new();
    store.fail_on("session-0");
    let config = AuthStateConfig::default().with_max_concurrency(NonZeroUsize::new(2).unwrap());
    let handle: AuthStateHandle<_, TestCreds> =
        AuthStateHandle::open(store.clone(), generate_creds, config)
            .await
            .unwrap();

    let entries: SignalDataMap = (0..6u8)
        .map(|i| (i.to_string(), Some(session_blob(i))))
        .collect();
    let result = handle
        .keys()
        .set(&SignalDataSet::from([(KeyCategory::Session, entries)]))
        .await;

    assert!(result.is_err());
    let ids = store.inner.ids().unwrap();
    assert_eq!(ids.len(), 5);
    assert!(!ids.contains(&"session-0".to_string()));
    assert!(store.max_in_flight() <= 2);
}

#[tokio::test]
async fn test_read_failure_waits_for_other_reads() {
    let store = FlakyStore::new();
    store.fail_on("session-1");
    let handle: AuthStateHandle<_, TestCreds> =
        AuthStateHandle::open(store.clone(), generate_creds, AuthStateConfig::default())
            .await
            .unwrap();
    let before = store.calls();

    let result = handle.keys().get(KeyCategory::Session, &["1", "2", "3", "4"]).await;
    assert!(result.is_err());
    assert_eq!(store.calls() - before, 4);
    assert_eq!(store.max_in_flight(), 3);
}

#[tokio::test]
async fn test_batches_run_concurrently() {
    let store = FlakyStore::new();
    let handle: AuthStateHandle<_, TestCreds> =
        AuthStateHandle::open(store.clone(), generate_creds, AuthStateConfig::default())
            .await
            .unwrap();

    let ids: Vec<String> = (0..10).map(|i| i.to_string()).collect();
    handle.keys().get(KeyCategory::Session, &ids).await.unwrap();
    assert_eq!(store.max_in_flight(), 10);
}

#[tokio::test]
async fn test_bounded_concurrency_gives_same_results() {
    let store = FlakyStore::new();
    let config = AuthStateConfig::default().with_max_concurrency(NonZeroUsize::new(2).unwrap());
    let handle: AuthStateHandle<_, TestCreds> =
        AuthStateHandle::open(store.clone(), generate_creds, config)
            .await
            .unwrap();

    let entries: SignalDataMap = (0..10u8)
        .map(|i| (i.to_string(), Some(session_blob(i))))
        .collect();
    handle
        .keys()
        .set(&SignalDataSet::from([(KeyCategory::Session, entries.clone())]))
        .await
        .unwrap();

    let ids: Vec<String> = entries.keys().cloned().collect();
    let found = handle.keys().get(KeyCategory::Session, &ids).await.unwrap();
    assert_eq!(found, entries);
    assert!(store.max_in_flight() <= 2);
}

#[tokio::test]
async fn test_diagnostics_see_each_access() {
    let sink = Arc::new(RecordingSink::default());
    let config = AuthStateConfig::default().with_shared_diagnostics(sink.clone());
    let handle: AuthStateHandle<_, TestCreds> =
        AuthStateHandle::open(MemoryDocumentStore::new(), generate_creds, config)
            .await
            .unwrap();
    assert_eq!(sink.events(), vec![(StoreOperation::Read, vec![CREDS_ID.to_string()])]);

    handle.keys().get(KeyCategory::PreKey, &["1", "2"]).await.unwrap();
    assert_eq!(sink.count(StoreOperation::GetKeys), 1);
    assert_eq!(sink.count(StoreOperation::Read), 3);

    handle.save_creds().await.unwrap();
    handle.remove_creds().await.unwrap();
    assert_eq!(sink.count(StoreOperation::SaveCreds), 1);
    assert_eq!(sink.count(StoreOperation::Write), 1);
    assert_eq!(sink.count(StoreOperation::RemoveCreds), 1);
    assert_eq!(sink.count(StoreOperation::Remove), 1);
}

#[tokio::test]
async fn test_diagnostics_do_not_change_results() {
    let quiet_store = MemoryDocumentStore::new();
    let loud_store = MemoryDocumentStore::new();
    let quiet = open(quiet_store.clone()).await;
    let loud: AuthStateHandle<_, TestCreds> = AuthStateHandle::open(
        loud_store.clone(),
        || quiet.creds().clone(),
        AuthStateConfig::default().with_diagnostics(RecordingSink::default()),
    )
    .await
    .unwrap();

    for handle in [&quiet, &loud] {
        handle.save_creds().await.unwrap();
        handle
            .keys()
            .set_one(KeyCategory::DeviceList, "alice", Some(session_blob(8)))
            .await
            .unwrap();
    }

    assert_eq!(quiet_store.ids().unwrap(), loud_store.ids().unwrap());
    assert_eq!(quiet_store.raw(CREDS_ID).unwrap(), loud_store.raw(CREDS_ID).unwrap());
}
