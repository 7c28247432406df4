use std::sync::Arc;
use std::time::Duration;

use registry_sync::metrics::gather_metrics;
use registry_sync::CleanupPolicy;
use registry_sync::InMemoryRegistry;
use registry_sync::InMemoryStore;
use registry_sync::StoreError;
use registry_sync::StoreOp;
use tokio::time::sleep;

use crate::common::*;

#[tokio::test(start_paused = true)]
async fn test_transient_store_failures_are_retried() {
    let registry = Arc::new(InMemoryRegistry::new());
    let store = Arc::new(InMemoryStore::new());
    for _ in 0..3 {
        store.fail_next(StoreOp::Create, StoreError::ServiceUnavailable("down".to_string()));
    }
    registry.create_child(PROVIDERS_PATH, provider("10.0.0.1", 20880, ""));

    let bridge = start_bridge(sync_config(CleanupPolicy::NonBlocking), &registry, &store);
    sleep(Duration::from_millis(10)).await;

    assert!(store.snapshot("dubbo", RECORD_NAME).is_some());
    assert_eq!(store.count_calls(StoreOp::Create), 4);
    assert!(gather_metrics().contains("registry_sync_reconcile_total"));

    bridge.stop().await;
}

// # Case 2: retries run out, the next registry change gets a fresh budget
#[tokio::test(start_paused = true)]
async fn test_exhausted_retries_recover_on_next_change() {
    let registry = Arc::new(InMemoryRegistry::new());
    let store = Arc::new(InMemoryStore::new());
    for _ in 0..11 {
        store.fail_next(StoreOp::Get, StoreError::Timeout(Duration::from_secs(5)));
    }
    registry.create_child(PROVIDERS_PATH, provider("10.0.0.1", 20880, ""));

    let bridge = start_bridge(sync_config(CleanupPolicy::NonBlocking), &registry, &store);
    sleep(Duration::from_millis(10)).await;
    assert_eq!(store.count_calls(StoreOp::Get), 11);
    assert!(store.is_empty());

    registry.create_child(PROVIDERS_PATH, provider("10.0.0.2", 20880, ""));
    sleep(SETTLE).await;

    assert_eq!(store.snapshot("dubbo", RECORD_NAME).unwrap().spec.endpoints.len(), 2);

    bridge.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_unreachable_registry_does_not_block_shutdown() {
    let registry = Arc::new(InMemoryRegistry::new());
    let store = Arc::new(InMemoryStore::new());
    registry.fail_next_watches(usize::MAX);

    let bridge = start_bridge(sync_config(CleanupPolicy::NonBlocking), &registry, &store);
    sleep(Duration::from_secs(5)).await;
    assert!(registry.watch_calls() >= 5);

    bridge.stop().await;
    assert!(store.calls().is_empty());
}
