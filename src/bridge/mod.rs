//! Runs one [`ProviderWatcher`] per configured service against a shared
//! store, translator and [`MembershipIndex`].


use std::sync::Arc;

use tokio::sync::watch;
use tracing::error;
use tracing::info;
use tracing::warn;

use crate::metrics::register_custom_metrics;
use crate::utils::async_task::spawn_task;
use crate::MembershipIndex;
use crate::ProviderWatcher;
use crate::Reconciler;
use crate::RegistryClient;
use crate::ResourceStore;
use crate::Result;
use crate::SnapshotTranslator;
use crate::SyncConfig;

pub struct Bridge<R, S, T>
where
    R: RegistryClient,
    S: ResourceStore,
    T: SnapshotTranslator,
{
    config: SyncConfig,
    registry: Arc<R>,
    reconciler: Arc<Reconciler<S, T>>,
}

impl<R, S, T> Bridge<R, S, T>
where
    R: RegistryClient,
    S: ResourceStore,
    T: SnapshotTranslator,
{
    /// `config` is expected to be validated already.
    pub fn new(
        config: SyncConfig,
        registry: Arc<R>,
        store: Arc<S>,
        translator: Arc<T>,
    ) -> Self {
        let index = Arc::new(MembershipIndex::new());
        let reconciler = Arc::new(Reconciler::new(
            store,
            translator,
            index,
            config.reconcile.duplicate_cleanup,
        ));
        Self {
            config,
            registry,
            reconciler,
        }
    }

    /// The name to namespace index shared by every watcher.
    pub fn index(&self) -> &Arc<MembershipIndex> {
        self.reconciler.index()
    }

    /// Spawns every watcher and waits until all of them have stopped.
    pub async fn run(
        self,
        shutdown_signal: watch::Receiver<()>,
    ) -> Result<()> {
        register_custom_metrics();

        if self.config.services.is_empty() {
            warn!("no service configured, nothing to bridge");
            return Ok(());
        }

        let mut handles = Vec::with_capacity(self.config.services.len());
        for service in &self.config.services {
            let watcher = ProviderWatcher::new(
                service.clone(),
                self.registry.clone(),
                self.reconciler.clone(),
                &self.config,
            );
            let rx = shutdown_signal.clone();
            spawn_task(
                &format!("watch-{}", service),
                move || watcher.run(rx),
                Some(&mut handles),
            );
        }
        info!("bridging {} service(s)", handles.len());

        for handle in handles {
            if let Err(e) = handle.await {
                error!("watch task panicked or was cancelled: {:?}", e);
            }
        }
        info!("all watches stopped");
        Ok(())
    }
}
