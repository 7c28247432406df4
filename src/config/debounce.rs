use std::time::Duration;

use config::ConfigError;
use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Quiet-period debouncing of registry change signals
///
/// A burst settles once no signal arrived for `debounce_after_ms`, or once
/// `debounce_max_ms` passed since its first signal, whichever comes first.
#[derive(Debug, Serialize, Deserialize, Clone, Copy)]
pub struct DebounceConfig {
    /// Quiet period after the last change signal (unit: milliseconds)
    #[serde(default = "default_debounce_after_ms")]
    pub debounce_after_ms: u64,

    /// Upper bound on how long a burst may keep buffering (unit: milliseconds)
    #[serde(default = "default_debounce_max_ms")]
    pub debounce_max_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            debounce_after_ms: default_debounce_after_ms(),
            debounce_max_ms: default_debounce_max_ms(),
        }
    }
}

impl DebounceConfig {
    pub fn debounce_after(&self) -> Duration {
        Duration::from_millis(self.debounce_after_ms)
    }

    pub fn debounce_max(&self) -> Duration {
        Duration::from_millis(self.debounce_max_ms)
    }

    pub fn validate(&self) -> Result<()> {
        if self.debounce_after_ms == 0 {
            return Err(Error::Config(ConfigError::Message(
                "debounce.debounce_after_ms must be greater than 0".to_string(),
            )));
        }
        if self.debounce_max_ms < self.debounce_after_ms {
            return Err(Error::Config(ConfigError::Message(format!(
                "debounce.debounce_max_ms ({}) must not be smaller than debounce_after_ms ({})",
                self.debounce_max_ms, self.debounce_after_ms
            ))));
        }
        Ok(())
    }
}

fn default_debounce_after_ms() -> u64 {
    500
}
fn default_debounce_max_ms() -> u64 {
    10_000
}
