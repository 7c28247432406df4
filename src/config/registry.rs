//! Registry watch configuration
//!
//! ```toml
//! [registry]
//! root = "dubbo"
//! providers_segment = "providers"
//! watch_retry_backoff_ms = 1000
//! watch_max_attempts = 0   # 0 = retry until shutdown
//! ```

use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_PROVIDERS_SEGMENT;
use crate::constants::DEFAULT_REGISTRY_ROOT;
use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegistryConfig {
    /// First path segment of every watched service
    #[serde(default = "default_root")]
    pub root: String,

    /// Last path segment, the node whose children are the providers
    #[serde(default = "default_providers_segment")]
    pub providers_segment: String,

    /// Fixed sleep between failed watch calls (unit: milliseconds)
    #[serde(default = "default_watch_retry_backoff_ms")]
    pub watch_retry_backoff_ms: u64,

    /// Maximum watch attempts per re-arm (0 means unlimited retries)
    #[serde(default)]
    pub watch_max_attempts: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            providers_segment: default_providers_segment(),
            watch_retry_backoff_ms: default_watch_retry_backoff_ms(),
            watch_max_attempts: 0,
        }
    }
}

impl RegistryConfig {
    /// `/<root>/<service>/<providers_segment>`
    pub fn providers_path(
        &self,
        service: &str,
    ) -> String {
        format!("/{}/{}/{}", self.root, service, self.providers_segment)
    }

    pub fn watch_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.watch_retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<()> {
        validate_segment(&self.root, "registry.root")?;
        validate_segment(&self.providers_segment, "registry.providers_segment")?;

        if self.watch_retry_backoff_ms == 0 {
            return Err(Error::InvalidConfig(
                "registry.watch_retry_backoff_ms must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

pub(super) fn validate_segment(
    value: &str,
    name: &str,
) -> Result<()> {
    if value.is_empty() {
        return Err(Error::InvalidConfig(format!("{} cannot be empty", name)));
    }
    if value.contains('/') {
        return Err(Error::InvalidConfig(format!(
            "{} must be a single path segment, got {:?}",
            name, value
        )));
    }
    Ok(())
}

fn default_root() -> String {
    DEFAULT_REGISTRY_ROOT.to_string()
}
fn default_providers_segment() -> String {
    DEFAULT_PROVIDERS_SEGMENT.to_string()
}
fn default_watch_retry_backoff_ms() -> u64 {
    1000
}
