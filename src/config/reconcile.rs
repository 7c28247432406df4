use serde::Deserialize;
use serde::Serialize;

use crate::constants::DEFAULT_NAMESPACE;
use crate::Error;
use crate::Result;

/// How a failed delete of a stale duplicate record is treated
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum CleanupPolicy {
    /// Log the failure and carry on with the primary create/update
    #[default]
    NonBlocking,
    /// Fail the reconciliation attempt
    Strict,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ReconcileConfig {
    #[serde(default)]
    pub duplicate_cleanup: CleanupPolicy,

    /// Namespace for providers that do not declare one
    #[serde(default = "default_namespace")]
    pub default_namespace: String,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            duplicate_cleanup: CleanupPolicy::default(),
            default_namespace: default_namespace(),
        }
    }
}

impl ReconcileConfig {
    pub fn validate(&self) -> Result<()> {
        if self.default_namespace.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "reconcile.default_namespace cannot be empty".into(),
            ));
        }
        Ok(())
    }
}

fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}
