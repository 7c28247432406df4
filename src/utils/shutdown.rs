use std::future::Future;

use tokio::signal::unix::signal;
use tokio::signal::unix::SignalKind;
use tokio::sync::watch;
use tracing::error;
use tracing::info;

use crate::Error;
use crate::Result;

/// Waits for SIGINT, SIGTERM or Ctrl+C, then fires `graceful_tx`.
pub async fn graceful_shutdown(graceful_tx: watch::Sender<()>) -> Result<()> {
    let mut sigint = signal(SignalKind::interrupt())
        .map_err(|e| Error::Fatal(format!("failed to install SIGINT handler: {}", e)))?;
    let mut sigterm = signal(SignalKind::terminate())
        .map_err(|e| Error::Fatal(format!("failed to install SIGTERM handler: {}", e)))?;

    let termination = async move {
        tokio::select! {
            _ = sigint.recv() => {
                info!("SIGINT detected.");
            },
            _ = sigterm.recv() => {
                info!("SIGTERM detected.");
            },
            _ = tokio::signal::ctrl_c() => {
                info!("Ctrl+C detected.");
            },
        }
    };

    shutdown_on(termination, graceful_tx).await
}

/// Fires `graceful_tx` once `trigger` completes.
pub(crate) async fn shutdown_on<F>(
    trigger: F,
    graceful_tx: watch::Sender<()>,
) -> Result<()>
where
    F: Future<Output = ()>,
{
    trigger.await;
    notify_shutdown(&graceful_tx)?;
    info!("Shutdown completed");
    Ok(())
}

pub(crate) fn notify_shutdown(graceful_tx: &watch::Sender<()>) -> Result<()> {
    graceful_tx.send(()).map_err(|e| {
        error!("Failed to send shutdown signal: {}", e);
        Error::SignalSenderClosed(format!("Failed to send shutdown signal: {}", e))
    })
}
