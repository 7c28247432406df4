use std::fs;
use std::fs::OpenOptions;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::Layer;

use crate::Error;
use crate::Result;

pub const LOG_FILE_NAME: &str = "registry-sync.log";

/// Installs the global subscriber writing to `<log_dir>/registry-sync.log`.
///
/// Filtering follows `RUST_LOG`. Keep the returned guard alive for as long
/// as logs should be flushed.
pub fn init_observability(log_dir: &Path) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir).map_err(|e| {
        Error::Fatal(format!("failed to create log dir {}: {}", log_dir.display(), e))
    })?;

    let log_path = log_dir.join(LOG_FILE_NAME);
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .map_err(|e| Error::Fatal(format!("failed to open {}: {}", log_path.display(), e)))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(log_file);
    let base_subscriber = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env());

    tracing_subscriber::registry()
        .with(base_subscriber)
        .try_init()
        .map_err(|e| Error::Fatal(format!("failed to install tracing subscriber: {}", e)))?;

    Ok(guard)
}
