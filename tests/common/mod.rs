use std::sync::Arc;
use std::time::Duration;

use registry_sync::Bridge;
use registry_sync::CleanupPolicy;
use registry_sync::InMemoryRegistry;
use registry_sync::InMemoryStore;
use registry_sync::MembershipIndex;
use registry_sync::ProviderUrlTranslator;
use registry_sync::Result;
use registry_sync::SyncConfig;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

pub const SERVICE: &str = "org.demo.Greeter";
pub const RECORD_NAME: &str = "org.demo.greeter";
pub const PROVIDERS_PATH: &str = "/dubbo/org.demo.Greeter/providers";

/// Longer than the default quiet period, shorter than the default cap
pub const SETTLE: Duration = Duration::from_secs(1);

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}

/// Registry child name of a provider, percent-encoded as providers write it.
pub fn provider(
    host: &str,
    port: u16,
    query: &str,
) -> String {
    let url = format!("dubbo://{}:{}/{}?{}", host, port, SERVICE, query);
    urlencoding::encode(&url).into_owned()
}

pub fn sync_config(cleanup: CleanupPolicy) -> SyncConfig {
    let mut config = SyncConfig {
        services: vec![SERVICE.to_string()],
        ..Default::default()
    };
    config.reconcile.duplicate_cleanup = cleanup;
    config
}

pub struct RunningBridge {
    pub index: Arc<MembershipIndex>,
    shutdown_tx: watch::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

impl RunningBridge {
    pub async fn stop(self) {
        self.shutdown_tx.send(()).expect("bridge should still listen");
        self.handle
            .await
            .expect("bridge task should not panic")
            .expect("bridge should stop cleanly");
    }
}

pub fn start_bridge(
    config: SyncConfig,
    registry: &Arc<InMemoryRegistry>,
    store: &Arc<InMemoryStore>,
) -> RunningBridge {
    enable_logger();
    let config = config.validate().expect("test config should be valid");
    let translator = Arc::new(ProviderUrlTranslator::from_config(&config.reconcile));
    let bridge = Bridge::new(config, registry.clone(), store.clone(), translator);
    let index = bridge.index().clone();

    let (shutdown_tx, shutdown_rx) = watch::channel(());
    let handle = tokio::spawn(bridge.run(shutdown_rx));
    RunningBridge {
        index,
        shutdown_tx,
        handle,
    }
}
