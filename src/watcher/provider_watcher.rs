use std::sync::Arc;

use tokio::sync::watch;
use tokio::time::sleep;
use tokio::time::sleep_until;
use tokio::time::Instant;
use tracing::debug;
use tracing::info;
use tracing::trace;
use tracing::warn;

use super::DebounceState;
use super::SettleDecision;
use crate::metrics::DEBOUNCED_EVENTS_METRIC;
use crate::registry::watch_until_success;
use crate::DebounceConfig;
use crate::Error;
use crate::Reconciler;
use crate::RegistryClient;
use crate::RegistryConfig;
use crate::ResourceStore;
use crate::Result;
use crate::ServiceWatch;
use crate::SnapshotTranslator;
use crate::SyncConfig;
use crate::SyncRetryPolicy;

/// Watches one registry service and pushes settled membership snapshots to
/// the store.
///
/// The loop reacts to three wake causes, in priority order: shutdown, the
/// settle timer, and a registry change signal. Reconciliations for the
/// service are strictly sequential because the loop waits for each push to
/// finish before polling again.
pub struct ProviderWatcher<R, S, T>
where
    R: RegistryClient,
    S: ResourceStore,
    T: SnapshotTranslator,
{
    watch: ServiceWatch,
    registry: Arc<R>,
    reconciler: Arc<Reconciler<S, T>>,
    registry_config: RegistryConfig,
    debounce: DebounceConfig,
    retry: SyncRetryPolicy,
    state: DebounceState,
    last_push: Option<Instant>,
}

impl<R, S, T> ProviderWatcher<R, S, T>
where
    R: RegistryClient,
    S: ResourceStore,
    T: SnapshotTranslator,
{
    pub fn new(
        service: impl Into<String>,
        registry: Arc<R>,
        reconciler: Arc<Reconciler<S, T>>,
        config: &SyncConfig,
    ) -> Self {
        Self {
            watch: ServiceWatch::new(service, &config.registry),
            registry,
            reconciler,
            registry_config: config.registry.clone(),
            debounce: config.debounce,
            retry: config.retry,
            state: DebounceState::new(),
            last_push: None,
        }
    }

    pub fn service(&self) -> &str {
        &self.watch.service
    }

    /// Runs until `shutdown_signal` fires.
    ///
    /// Returns an error only when the registry watch cannot be re-armed
    /// under a bounded `watch_max_attempts`.
    pub async fn run(
        mut self,
        mut shutdown_signal: watch::Receiver<()>,
    ) -> Result<()> {
        match self.watch_loop(&mut shutdown_signal).await {
            Err(Error::Exit) => {
                info!("[{}] watch stopped during registry retry", self.watch.service);
                Ok(())
            }
            other => other,
        }
    }

    async fn watch_loop(
        &mut self,
        shutdown_signal: &mut watch::Receiver<()>,
    ) -> Result<()> {
        let (children, mut change_signal) = watch_until_success(
            self.registry.as_ref(),
            &self.watch.service,
            &self.watch.path,
            &self.registry_config,
            shutdown_signal,
        )
        .await?;
        self.watch.replace_children(children);

        // Nothing may ever change again, so the first snapshot is pushed as is
        self.push().await;

        let mut settle_deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                biased;
                // P0: shutdown received
                _ = shutdown_signal.changed() => {
                    warn!("[{}] shutdown signal received.", self.watch.service);
                    return Ok(());
                }

                // P1: settle check, ahead of new signals so churn cannot hold off the cap
                _ = sleep_until(settle_deadline.unwrap_or_else(Instant::now)), if settle_deadline.is_some() => {
                    settle_deadline = self.on_settle_check().await;
                }

                // P2: registry change, a dropped sender means the watch was lost
                event = &mut change_signal => {
                    self.state.record_event(Instant::now());
                    DEBOUNCED_EVENTS_METRIC
                        .with_label_values(&[self.watch.service.as_str()])
                        .inc();

                    match event {
                        Ok(e) => trace!("[{}] registry event: {:?}", self.watch.service, e),
                        Err(_) => {
                            warn!(
                                "[{}] registry watch on {} was lost, re-arming",
                                self.watch.service, self.watch.path
                            );
                            self.backoff_before_rearm(shutdown_signal).await?;
                        }
                    }

                    let (children, next_signal) = watch_until_success(
                        self.registry.as_ref(),
                        &self.watch.service,
                        &self.watch.path,
                        &self.registry_config,
                        shutdown_signal,
                    )
                    .await?;
                    self.watch.replace_children(children);
                    change_signal = next_signal;
                    settle_deadline = self.state.next_deadline(&self.debounce);
                }
            }
        }
    }

    /// Waits `watch_retry_backoff` so a flapping session cannot spin the loop.
    async fn backoff_before_rearm(
        &self,
        shutdown_signal: &mut watch::Receiver<()>,
    ) -> Result<()> {
        tokio::select! {
            biased;
            _ = shutdown_signal.changed() => Err(Error::Exit),
            _ = sleep(self.registry_config.watch_retry_backoff()) => Ok(()),
        }
    }

    /// Returns the next settle deadline, `None` once the burst is pushed.
    async fn on_settle_check(&mut self) -> Option<Instant> {
        let now = Instant::now();
        match self.state.evaluate(now, &self.debounce) {
            SettleDecision::Idle => None,
            SettleDecision::Settled {
                events,
                since_first,
                since_last,
            } => {
                let since_push = self.last_push.map(|t| now.saturating_duration_since(t));
                let round = self.state.complete_burst();
                info!(
                    "Sync {} debounce stable[{}] {}: {:?} since last change, {:?} since last push",
                    self.watch.service, round, events, since_last, since_push
                );
                debug!("[{}] burst lasted {:?}", self.watch.service, since_first);
                self.push().await;
                None
            }
            SettleDecision::Reschedule(deadline) => Some(deadline),
        }
    }

    async fn push(&mut self) {
        let outcome = self
            .reconciler
            .sync_until_max_retries(&self.watch.service, &self.watch.children, &self.retry)
            .await;
        debug!(
            "[{}] push finished after {} attempt(s), synced: {}",
            self.watch.service,
            outcome.attempts(),
            outcome.is_synced()
        );
        self.last_push = Some(Instant::now());
    }
}
