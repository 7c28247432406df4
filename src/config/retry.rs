use serde::Deserialize;
use serde::Serialize;

/// Retry policy of one reconciliation burst
///
/// Retries are immediate: every attempt re-reads the store, and the next
/// registry change triggers a fresh burst anyway.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct SyncRetryPolicy {
    /// Extra attempts after the first failed one, retryable errors only
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
}

impl Default for SyncRetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
        }
    }
}

fn default_max_retries() -> usize {
    10
}
