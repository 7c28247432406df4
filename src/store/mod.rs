//! Resource store client
//!
//! The control plane's declarative store of namespaced resource records.
//! Updates use optimistic concurrency: the submitted record must carry the
//! version token of the copy it was derived from.

mod memory;
pub use memory::*;


use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::ResourceRecord;
use crate::StoreError;

#[cfg_attr(test, automock)]
#[async_trait]
pub trait ResourceStore: Send + Sync + 'static {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ResourceRecord, StoreError>;

    /// Creates `record` in `record.namespace`.
    async fn create(
        &self,
        record: &ResourceRecord,
    ) -> Result<ResourceRecord, StoreError>;

    /// Replaces the stored copy. `record.resource_version` must match it.
    async fn update(
        &self,
        record: &ResourceRecord,
    ) -> Result<ResourceRecord, StoreError>;

    async fn delete(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError>;

    /// Records of every namespace.
    async fn list_all(&self) -> Result<Vec<ResourceRecord>, StoreError>;
}
