use std::sync::Arc;

use registry_sync::utils::observability::init_observability;
use registry_sync::utils::shutdown::graceful_shutdown;
use registry_sync::Bridge;
use registry_sync::InMemoryRegistry;
use registry_sync::InMemoryStore;
use registry_sync::ProviderUrlTranslator;
use registry_sync::Result;
use registry_sync::SyncConfig;
use tokio::sync::watch;
use tracing::error;
use tracing::info;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> Result<()> {
    let config = SyncConfig::new()?.validate()?;

    // Initializing Logs
    let _guard = init_observability(&config.log.log_dir)?;

    // Initializing Shutdown Signal
    let (graceful_tx, graceful_rx) = watch::channel(());

    let translator = ProviderUrlTranslator::from_config(&config.reconcile);
    let bridge = Bridge::new(
        config,
        Arc::new(InMemoryRegistry::new()),
        Arc::new(InMemoryStore::new()),
        Arc::new(translator),
    );

    info!("Application started. Waiting for CTRL+C signal...");
    tokio::spawn(async {
        if let Err(e) = graceful_shutdown(graceful_tx).await {
            error!("Failed to shutdown: {:?}", e);
        }
    });

    if let Err(e) = bridge.run(graceful_rx).await {
        error!("bridge stops: {:?}", e);
    }

    info!("Exiting program.");
    Ok(())
}
