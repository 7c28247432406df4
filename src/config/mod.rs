//! Configuration management for the registry sync bridge.
//!
//! Provides hierarchical configuration loading with priority:
//! 1. Default values (hardcoded)
//! 2. Config file named by `CONFIG_PATH`
//! 3. Runtime override files (`with_override_config`)
//! 4. Environment variables with `SYNC__` prefix (highest priority)
//!

mod debounce;
mod reconcile;
mod registry;
mod retry;
pub use debounce::*;
pub use reconcile::*;
pub use registry::*;
pub use retry::*;


//---
use std::collections::HashSet;
use std::env;
use std::path::PathBuf;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct SyncConfig {
    /// Registry layout and watch retry policy
    #[serde(default)]
    pub registry: RegistryConfig,
    /// Burst collapsing thresholds
    #[serde(default)]
    pub debounce: DebounceConfig,
    /// Reconciliation retry bound
    #[serde(default)]
    pub retry: SyncRetryPolicy,
    /// Record placement and duplicate cleanup
    #[serde(default)]
    pub reconcile: ReconcileConfig,
    /// Registry services to bridge, one watch each
    #[serde(default)]
    pub services: Vec<String>,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LogConfig {
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: default_log_dir(),
        }
    }
}

fn default_log_dir() -> PathBuf {
    PathBuf::from("/tmp/logs/registry-sync")
}

impl SyncConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Callers MUST call `validate()` once all overrides are applied.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("CONFIG_PATH", "config/sync.toml");
    /// std::env::set_var("SYNC__DEBOUNCE__DEBOUNCE_AFTER_MS", "250");
    /// let cfg = SyncConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(env_source());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies additional configuration overrides from file without validation.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates configuration and returns validated instance.
    pub fn validate(self) -> Result<Self> {
        self.registry.validate()?;
        self.debounce.validate()?;
        self.reconcile.validate()?;
        self.validate_services()?;
        Ok(self)
    }

    fn validate_services(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for service in &self.services {
            registry::validate_segment(service, "services[]")?;
            if !seen.insert(service.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "Duplicate service {} in services",
                    service
                )));
            }
        }
        Ok(())
    }
}

fn env_source() -> Environment {
    Environment::with_prefix("SYNC")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("services")
}
