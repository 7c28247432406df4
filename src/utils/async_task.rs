use tokio::task::JoinHandle;
use tracing::debug;
use tracing::error;

use crate::Result;

/// Spawns `task_fn` on the runtime and tracks its `JoinHandle`.
///
/// A task that ends with an error is logged under `name`; the handle itself
/// always resolves to `()`.
pub(crate) fn spawn_task<F, Fut>(
    name: &str,
    task_fn: F,
    handles: Option<&mut Vec<JoinHandle<()>>>,
) where
    F: FnOnce() -> Fut + Send + 'static,
    Fut: std::future::Future<Output = Result<()>> + Send + 'static,
{
    let name = name.to_string();
    let handle = tokio::spawn(async move {
        match task_fn().await {
            Ok(()) => debug!("spawned task: {name} stopped"),
            Err(e) => error!("spawned task: {name} stopped or encountered an error: {:?}", e),
        }
    });

    if let Some(h) = handles {
        h.push(handle);
    }
}
