use std::collections::BTreeSet;
use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::oneshot;
use tracing::trace;

use super::ChangeSignal;
use super::RegistryClient;
use super::RegistryEvent;
use crate::RegistryError;

/// Process-local registry with the same one-shot watch semantics as a
/// remote hierarchical registry.
///
/// Watching a path that has never been written yields an empty child list
/// rather than an error, so watches may be established before the first
/// provider registers.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    inner: Mutex<RegistryState>,
}

#[derive(Debug, Default)]
struct RegistryState {
    nodes: HashMap<String, BTreeSet<String>>,
    watchers: HashMap<String, Vec<oneshot::Sender<RegistryEvent>>>,
    pending_failures: usize,
    watch_calls: usize,
}

impl RegistryState {
    fn fire(
        &mut self,
        path: &str,
        event: RegistryEvent,
    ) {
        if let Some(watchers) = self.watchers.remove(path) {
            trace!("firing {} watchers on {}", watchers.len(), path);
            for tx in watchers {
                // Receiver may have been dropped by an exited watch loop
                let _ = tx.send(event.clone());
            }
        }
    }
}

impl InMemoryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `child` under `path`. Fires the path's watchers when the
    /// child list changed.
    pub fn create_child(
        &self,
        path: &str,
        child: impl Into<String>,
    ) {
        let mut state = self.inner.lock();
        let inserted = state.nodes.entry(path.to_string()).or_default().insert(child.into());
        if inserted {
            state.fire(path, RegistryEvent::ChildrenChanged { path: path.to_string() });
        }
    }

    pub fn delete_child(
        &self,
        path: &str,
        child: &str,
    ) {
        let mut state = self.inner.lock();
        let removed = state.nodes.get_mut(path).map(|c| c.remove(child)).unwrap_or(false);
        if removed {
            state.fire(path, RegistryEvent::ChildrenChanged { path: path.to_string() });
        }
    }

    /// Replaces the whole child list, firing watchers unconditionally.
    pub fn set_children<I, S>(
        &self,
        path: &str,
        children: I,
    ) where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut state = self.inner.lock();
        state
            .nodes
            .insert(path.to_string(), children.into_iter().map(Into::into).collect());
        state.fire(path, RegistryEvent::ChildrenChanged { path: path.to_string() });
    }

    /// Removes the node and all its children.
    pub fn delete_node(
        &self,
        path: &str,
    ) {
        let mut state = self.inner.lock();
        state.nodes.remove(path);
        state.fire(path, RegistryEvent::NodeDeleted { path: path.to_string() });
    }

    /// Drops every armed watch without firing it, as a lost session does.
    pub fn expire_session(&self) {
        self.inner.lock().watchers.clear();
    }

    /// The next `n` watch calls fail with `RegistryError::WatchFailed`.
    pub fn fail_next_watches(
        &self,
        n: usize,
    ) {
        self.inner.lock().pending_failures = n;
    }

    pub fn children(
        &self,
        path: &str,
    ) -> Vec<String> {
        self.inner
            .lock()
            .nodes
            .get(path)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of watch calls received, failed ones included.
    pub fn watch_calls(&self) -> usize {
        self.inner.lock().watch_calls
    }
}

#[async_trait]
impl RegistryClient for InMemoryRegistry {
    async fn watch_children(
        &self,
        path: &str,
    ) -> std::result::Result<(Vec<String>, ChangeSignal), RegistryError> {
        let mut state = self.inner.lock();
        state.watch_calls += 1;

        if state.pending_failures > 0 {
            state.pending_failures -= 1;
            return Err(RegistryError::WatchFailed {
                path: path.to_string(),
                reason: "injected failure".to_string(),
            });
        }

        let children = state
            .nodes
            .get(path)
            .map(|c| c.iter().cloned().collect())
            .unwrap_or_default();

        let (tx, rx) = oneshot::channel();
        state.watchers.entry(path.to_string()).or_default().push(tx);
        Ok((children, rx))
    }
}
