use tracing::error;
use tracing::info;

use super::Reconciler;
use crate::metrics::RECONCILE_TOTAL_METRIC;
use crate::Error;
use crate::ResourceStore;
use crate::SnapshotTranslator;
use crate::SyncRetryPolicy;

/// Result of one settled burst, after retries.
#[derive(Debug)]
pub enum SyncOutcome {
    Synced { attempts: usize },
    /// Every attempt failed with a retryable error
    Exhausted { attempts: usize, error: Error },
    /// An attempt failed with a non-retryable error
    Fatal { attempts: usize, error: Error },
}

impl SyncOutcome {
    pub fn attempts(&self) -> usize {
        match self {
            SyncOutcome::Synced { attempts }
            | SyncOutcome::Exhausted { attempts, .. }
            | SyncOutcome::Fatal { attempts, .. } => *attempts,
        }
    }

    pub fn is_synced(&self) -> bool {
        matches!(self, SyncOutcome::Synced { .. })
    }

    fn label(&self) -> &'static str {
        match self {
            SyncOutcome::Synced { .. } => "synced",
            SyncOutcome::Exhausted { .. } => "exhausted",
            SyncOutcome::Fatal { .. } => "fatal",
        }
    }
}

impl<S, T> Reconciler<S, T>
where
    S: ResourceStore,
    T: SnapshotTranslator,
{
    /// Reconciles until success, a non-retryable error, or `max_retries`
    /// immediate retries. Failures are logged, never propagated: the next
    /// registry change starts a fresh burst.
    pub async fn sync_until_max_retries(
        &self,
        service: &str,
        children: &[String],
        policy: &SyncRetryPolicy,
    ) -> SyncOutcome {
        let mut attempts = 0;
        let outcome = loop {
            attempts += 1;
            match self.reconcile(service, children).await {
                Ok(()) => break SyncOutcome::Synced { attempts },
                Err(e) if e.is_retryable() && attempts <= policy.max_retries => {
                    error!(
                        "Failed to synchronize service {} to the mesh, error: {}, retrying {} ...",
                        service, e, attempts
                    );
                }
                Err(e) if e.is_retryable() => {
                    error!(
                        "Failed to synchronize service {} to the mesh after {} attempts: {}",
                        service, attempts, e
                    );
                    break SyncOutcome::Exhausted { attempts, error: e };
                }
                Err(e) => {
                    error!("Failed to synchronize service {} to the mesh: {}", service, e);
                    break SyncOutcome::Fatal { attempts, error: e };
                }
            }
        };

        if outcome.is_synced() && attempts > 1 {
            info!("service {} synchronized after {} attempts", service, attempts);
        }
        RECONCILE_TOTAL_METRIC
            .with_label_values(&[service, outcome.label()])
            .inc();
        outcome
    }
}
