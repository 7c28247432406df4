//! Registry watch adapter
//!
//! The registry is a hierarchical key space whose service providers register
//! as ephemeral children of `/<root>/<service>/<providers>`. A watch returns
//! the current children together with a one-shot [`ChangeSignal`] that fires
//! on the next change of that child list. The caller re-arms by watching
//! again.

mod memory;
pub use memory::*;


#[cfg(test)]
use mockall::automock;
use async_trait::async_trait;
use tokio::sync::oneshot;
use tokio::sync::watch;
use tokio::time::sleep;
use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::metrics::WATCH_FAILURES_METRIC;
use crate::Error;
use crate::RegistryConfig;
use crate::RegistryError;
use crate::Result;

/// Fires once for the next change at the watched path. A dropped sender
/// means the registry session lost the watch.
pub type ChangeSignal = oneshot::Receiver<RegistryEvent>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistryEvent {
    ChildrenChanged { path: String },
    NodeDeleted { path: String },
}

#[cfg_attr(test, automock)]
#[async_trait]
pub trait RegistryClient: Send + Sync + 'static {
    /// Returns the current children of `path` and arms a one-shot watch on
    /// them. Each call arms a fresh watch.
    async fn watch_children(
        &self,
        path: &str,
    ) -> std::result::Result<(Vec<String>, ChangeSignal), RegistryError>;
}

/// Watches `path` until the registry answers.
///
/// Failed calls are retried after a fixed backoff. With
/// `watch_max_attempts == 0` this only returns once a watch succeeds or the
/// shutdown signal fires (`Error::Exit`). A bounded policy gives up with
/// `RegistryError::WatchExhausted`.
pub(crate) async fn watch_until_success<R>(
    client: &R,
    service: &str,
    path: &str,
    config: &RegistryConfig,
    shutdown_signal: &mut watch::Receiver<()>,
) -> Result<(Vec<String>, ChangeSignal)>
where
    R: RegistryClient + ?Sized,
{
    let backoff = config.watch_retry_backoff();
    let max_attempts = config.watch_max_attempts;
    let mut attempts = 0;

    loop {
        attempts += 1;
        let result = tokio::select! {
            biased;
            _ = shutdown_signal.changed() => {
                warn!("[{}] shutdown signal received while watching {}", service, path);
                return Err(Error::Exit);
            }
            r = client.watch_children(path) => r,
        };

        match result {
            Ok((children, signal)) => {
                debug!("[{}] watching {} with {} children", service, path, children.len());
                return Ok((children, signal));
            }
            Err(e) => {
                error!("failed to watch registry path {}, {}", path, e);
                WATCH_FAILURES_METRIC.with_label_values(&[service]).inc();
            }
        }

        if max_attempts > 0 && attempts >= max_attempts {
            return Err(RegistryError::WatchExhausted {
                path: path.to_string(),
                attempts,
            }
            .into());
        }

        tokio::select! {
            biased;
            _ = shutdown_signal.changed() => {
                warn!("[{}] shutdown signal received during watch backoff", service);
                return Err(Error::Exit);
            }
            _ = sleep(backoff) => {}
        }
    }
}
