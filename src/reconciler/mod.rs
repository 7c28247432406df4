//! Converges the resource store onto the latest registry snapshot.
//!
//! One `reconcile` call is one attempt: translate, then create, update or
//! delete the service's record, cleaning up a copy left in another
//! namespace on the way. Retrying is the job of
//! [`Reconciler::sync_until_max_retries`].

mod retry;
pub use retry::*;


use std::sync::Arc;

use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::constants::FIELD_MANAGER;
use crate::CleanupPolicy;
use crate::MembershipIndex;
use crate::ResourceRecord;
use crate::ResourceStore;
use crate::Result;
use crate::SnapshotTranslator;

pub struct Reconciler<S, T>
where
    S: ResourceStore,
    T: SnapshotTranslator,
{
    store: Arc<S>,
    translator: Arc<T>,
    index: Arc<MembershipIndex>,
    cleanup: CleanupPolicy,
}

impl<S, T> Reconciler<S, T>
where
    S: ResourceStore,
    T: SnapshotTranslator,
{
    pub fn new(
        store: Arc<S>,
        translator: Arc<T>,
        index: Arc<MembershipIndex>,
        cleanup: CleanupPolicy,
    ) -> Self {
        Self {
            store,
            translator,
            index,
            cleanup,
        }
    }

    pub fn index(&self) -> &Arc<MembershipIndex> {
        &self.index
    }

    /// Single reconciliation attempt for `service` with registry `children`.
    pub async fn reconcile(
        &self,
        service: &str,
        children: &[String],
    ) -> Result<()> {
        let record = self.translator.to_record(service, children)?;

        // The last provider deregistered
        if !record.has_endpoints() {
            info!(
                "found service without providers: {}, delete the corresponding record",
                record.name
            );
            return self.delete_record(&record.name).await;
        }

        // A service name is the mesh-wide routing key: a copy left in another
        // namespace would make routing ambiguous.
        if let Some(old_ns) = self.index.namespace_of(&record.name) {
            if old_ns != record.namespace {
                error!(
                    "found record {} in two namespaces: {} {}, delete the older one {}/{}",
                    record.name, old_ns, record.namespace, old_ns, record.name
                );
                self.resolve_duplicate(&record, &old_ns).await?;
            }
        }

        match self.store.get(&record.namespace, &record.name).await {
            Ok(existing) => self.update_record(record, &existing).await,
            Err(e) if e.is_not_found() => self.create_record(record).await,
            Err(e) => Err(e.into()),
        }
    }

    async fn create_record(
        &self,
        mut record: ResourceRecord,
    ) -> Result<()> {
        record.managed_by = Some(FIELD_MANAGER.to_string());
        let created = self.store.create(&record).await?;
        self.index.record(&created.name, &created.namespace);
        info!("record {} has been created: {}", created.name, created.to_json());
        Ok(())
    }

    /// Routing fields and the version token come from `existing`, membership
    /// from `record`.
    async fn update_record(
        &self,
        mut record: ResourceRecord,
        existing: &ResourceRecord,
    ) -> Result<()> {
        record.carry_routing_from(existing);
        record.managed_by = Some(FIELD_MANAGER.to_string());
        let updated = self.store.update(&record).await?;
        self.index.record(&updated.name, &updated.namespace);
        info!("record {} has been updated: {}", updated.name, updated.to_json());
        Ok(())
    }

    /// Deletes the stale copy of `record.name` in `old_ns`. Failures only
    /// abort the attempt under [`CleanupPolicy::Strict`].
    async fn resolve_duplicate(
        &self,
        record: &ResourceRecord,
        old_ns: &str,
    ) -> Result<()> {
        match self.store.delete(old_ns, &record.name).await {
            Ok(()) => {
                self.index.forget_if(&record.name, old_ns);
                info!("stale record {}/{} has been deleted", old_ns, record.name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                self.index.forget_if(&record.name, old_ns);
                debug!("stale record {}/{} already gone", old_ns, record.name);
                Ok(())
            }
            Err(e) => match self.cleanup {
                CleanupPolicy::NonBlocking => {
                    error!("failed to delete record: {}/{}: {}", old_ns, record.name, e);
                    Ok(())
                }
                CleanupPolicy::Strict => Err(e.into()),
            },
        }
    }

    /// Deletes the record named `name` wherever it lives.
    ///
    /// Unindexed names are located with a scan of every namespace. A record
    /// that exists nowhere is a successful no-op.
    pub async fn delete_record(
        &self,
        name: &str,
    ) -> Result<()> {
        let namespace = match self.index.namespace_of(name) {
            Some(ns) => Some(ns),
            None => self.scan_namespace_of(name).await?,
        };

        let Some(ns) = namespace else {
            info!("record {} doesn't exist", name);
            return Ok(());
        };

        match self.store.delete(&ns, name).await {
            Ok(()) => {
                self.index.forget_if(name, &ns);
                info!("record {}/{} has been deleted", ns, name);
                Ok(())
            }
            Err(e) if e.is_not_found() => {
                self.index.forget_if(name, &ns);
                info!("record {}/{} doesn't exist", ns, name);
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn scan_namespace_of(
        &self,
        name: &str,
    ) -> Result<Option<String>> {
        let records = self.store.list_all().await.map_err(|e| {
            warn!("failed to list records while looking for {}: {}", name, e);
            e
        })?;
        Ok(records.into_iter().find(|r| r.name == name).map(|r| r.namespace))
    }
}
