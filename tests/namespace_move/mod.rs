use std::sync::Arc;
use std::time::Duration;

use registry_sync::CleanupPolicy;
use registry_sync::InMemoryRegistry;
use registry_sync::InMemoryStore;
use registry_sync::StoreError;
use registry_sync::StoreOp;
use tokio::time::sleep;

use crate::common::*;

async fn start_in_namespace_a(
    cleanup: CleanupPolicy,
) -> (Arc<InMemoryRegistry>, Arc<InMemoryStore>, RunningBridge) {
    let registry = Arc::new(InMemoryRegistry::new());
    let store = Arc::new(InMemoryStore::new());
    registry.create_child(PROVIDERS_PATH, provider("10.0.0.1", 20880, "namespace=a"));

    let bridge = start_bridge(sync_config(cleanup), &registry, &store);
    sleep(Duration::from_millis(10)).await;
    assert!(store.snapshot("a", RECORD_NAME).is_some());
    (registry, store, bridge)
}

fn move_to_namespace_b(registry: &InMemoryRegistry) {
    registry.set_children(PROVIDERS_PATH, vec![provider("10.0.0.2", 20880, "namespace=b")]);
}

// # Case 1: a service moving namespaces leaves a single record
//
// ## Criterias:
// - the old record is deleted before the new one is created
// - index follows the new namespace
#[tokio::test(start_paused = true)]
async fn test_namespace_move_removes_stale_record() {
    let (registry, store, bridge) = start_in_namespace_a(CleanupPolicy::NonBlocking).await;

    move_to_namespace_b(&registry);
    sleep(SETTLE).await;

    assert!(store.snapshot("a", RECORD_NAME).is_none());
    assert!(store.snapshot("b", RECORD_NAME).is_some());
    assert_eq!(bridge.index.namespace_of(RECORD_NAME).as_deref(), Some("b"));

    let ops: Vec<StoreOp> = store.calls().iter().map(|c| c.op).collect();
    let delete_at = ops.iter().position(|op| *op == StoreOp::Delete).unwrap();
    let create_at = ops.iter().rposition(|op| *op == StoreOp::Create).unwrap();
    assert!(delete_at < create_at);

    bridge.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_failed_cleanup_does_not_block_new_namespace() {
    let (registry, store, bridge) = start_in_namespace_a(CleanupPolicy::NonBlocking).await;
    store.fail_next(StoreOp::Delete, StoreError::Forbidden("rbac".to_string()));

    move_to_namespace_b(&registry);
    sleep(SETTLE).await;

    assert!(store.snapshot("a", RECORD_NAME).is_some(), "stale copy is left behind");
    assert!(store.snapshot("b", RECORD_NAME).is_some());

    bridge.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_strict_cleanup_keeps_old_namespace_on_failure() {
    let (registry, store, bridge) = start_in_namespace_a(CleanupPolicy::Strict).await;
    store.fail_next(StoreOp::Delete, StoreError::Forbidden("rbac".to_string()));

    move_to_namespace_b(&registry);
    sleep(SETTLE).await;

    assert!(store.snapshot("a", RECORD_NAME).is_some());
    assert!(store.snapshot("b", RECORD_NAME).is_none());
    assert_eq!(bridge.index.namespace_of(RECORD_NAME).as_deref(), Some("a"));

    bridge.stop().await;
}
