//! Per-service debounce engine.
//!
//! A [`ProviderWatcher`] owns one [`crate::ServiceWatch`] and its
//! [`DebounceState`]. Registry change signals are buffered until the burst
//! is quiet for `debounce_after_ms` or has lasted `debounce_max_ms`, then the
//! latest snapshot is reconciled once.

mod debounce;
mod provider_watcher;
pub use debounce::*;
pub use provider_watcher::*;
