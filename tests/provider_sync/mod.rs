use std::sync::Arc;
use std::time::Duration;

use registry_sync::CleanupPolicy;
use registry_sync::InMemoryRegistry;
use registry_sync::InMemoryStore;
use registry_sync::RecordPort;
use registry_sync::ResourceRecord;
use tokio::time::sleep;

use crate::common::*;

// # Case 1: providers registering and leaving
//
// ## Criterias:
// - the record is named after the lowercased service
// - endpoints are sorted and labelled from the provider URLs
// - the record is deleted once the last provider leaves
#[tokio::test(start_paused = true)]
async fn test_provider_lifecycle_is_mirrored_in_store() {
    let registry = Arc::new(InMemoryRegistry::new());
    let store = Arc::new(InMemoryStore::new());
    registry.create_child(PROVIDERS_PATH, provider("10.0.0.2", 20880, "version=1.0"));

    let bridge = start_bridge(sync_config(CleanupPolicy::NonBlocking), &registry, &store);
    sleep(Duration::from_millis(10)).await;

    let record = store.snapshot("dubbo", RECORD_NAME).expect("record created");
    assert_eq!(record.spec.hosts, vec![RECORD_NAME.to_string()]);
    assert_eq!(record.spec.ports[0].number, 20880);
    assert_eq!(record.managed_by.as_deref(), Some("registry-sync"));
    assert_eq!(record.spec.endpoints[0].labels.get("version").map(String::as_str), Some("1.0"));
    assert_eq!(bridge.index.namespace_of(RECORD_NAME).as_deref(), Some("dubbo"));

    registry.create_child(PROVIDERS_PATH, provider("10.0.0.1", 20880, "version=1.1"));
    sleep(SETTLE).await;

    let record = store.snapshot("dubbo", RECORD_NAME).unwrap();
    let addresses: Vec<&str> = record.spec.endpoints.iter().map(|e| e.address.as_str()).collect();
    assert_eq!(addresses, vec!["10.0.0.1", "10.0.0.2"]);

    registry.set_children(PROVIDERS_PATH, Vec::<String>::new());
    sleep(SETTLE).await;

    assert!(store.is_empty());
    assert!(bridge.index.is_empty());

    bridge.stop().await;
}

// # Case 2: operator-tuned routing fields survive membership updates
#[tokio::test(start_paused = true)]
async fn test_existing_routing_fields_are_preserved() {
    let registry = Arc::new(InMemoryRegistry::new());
    let store = Arc::new(InMemoryStore::new());

    let mut existing = ResourceRecord::new(RECORD_NAME, "dubbo");
    existing.spec.ports = vec![RecordPort {
        number: 30000,
        name: "grpc-tuned".to_string(),
        protocol: "GRPC".to_string(),
    }];
    store.insert(existing.clone());
    registry.create_child(PROVIDERS_PATH, provider("10.0.0.1", 20880, ""));

    let bridge = start_bridge(sync_config(CleanupPolicy::NonBlocking), &registry, &store);
    sleep(Duration::from_millis(10)).await;

    let record = store.snapshot("dubbo", RECORD_NAME).unwrap();
    assert_eq!(record.spec.ports, existing.spec.ports);
    assert_eq!(record.spec.endpoints.len(), 1);
    assert_eq!(record.spec.endpoints[0].address, "10.0.0.1");

    bridge.stop().await;
}

#[tokio::test(start_paused = true)]
async fn test_malformed_provider_blocks_sync_until_fixed() {
    let registry = Arc::new(InMemoryRegistry::new());
    let store = Arc::new(InMemoryStore::new());
    registry.create_child(PROVIDERS_PATH, "not%20a%20url");

    let bridge = start_bridge(sync_config(CleanupPolicy::NonBlocking), &registry, &store);
    sleep(SETTLE).await;
    assert!(store.is_empty());

    registry.set_children(PROVIDERS_PATH, vec![provider("10.0.0.1", 20880, "")]);
    sleep(SETTLE).await;
    assert_eq!(store.len(), 1);

    bridge.stop().await;
}
