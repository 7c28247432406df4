//! Bridges a watch-capable service registry into a service-mesh control
//! plane.
//!
//! Every watched service gets a [`ProviderWatcher`] that buffers registry
//! change signals, waits for the burst to settle and then converges the
//! service's [`ResourceRecord`] through the [`Reconciler`]. A [`Bridge`] runs
//! one watcher per configured service against a shared [`MembershipIndex`].

mod bridge;
mod config;
mod constants;
mod errors;
mod index;
mod model;
mod reconciler;
mod registry;
mod store;
mod translator;
mod watcher;

pub mod metrics;
pub mod utils;

pub use bridge::*;
pub use config::*;
pub use errors::*;
pub use index::*;
pub use model::*;
pub use reconciler::*;
pub use registry::*;
pub use store::*;
pub use translator::*;
pub use watcher::*;

//-----------------------------------------------------------
// Test utils


#[cfg(test)]
pub mod test_utils;
