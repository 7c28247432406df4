use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::trace;

use super::ResourceStore;
use crate::ResourceRecord;
use crate::StoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    Get,
    Create,
    Update,
    Delete,
    List,
}

/// One request observed by [`InMemoryStore`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCall {
    pub op: StoreOp,
    /// `None` for a list across all namespaces
    pub namespace: Option<String>,
    pub name: Option<String>,
}

/// Namespaced record store with monotonically increasing version tokens.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: Mutex<StoreState>,
}

#[derive(Debug, Default)]
struct StoreState {
    /// (namespace, name) -> record
    records: BTreeMap<(String, String), ResourceRecord>,
    next_version: u64,
    injected: HashMap<StoreOp, VecDeque<StoreError>>,
    calls: Vec<StoreCall>,
}

impl StoreState {
    fn begin(
        &mut self,
        op: StoreOp,
        namespace: Option<&str>,
        name: Option<&str>,
    ) -> Result<(), StoreError> {
        trace!("store {:?} {:?}/{:?}", op, namespace, name);
        self.calls.push(StoreCall {
            op,
            namespace: namespace.map(str::to_string),
            name: name.map(str::to_string),
        });
        match self.injected.get_mut(&op).and_then(|q| q.pop_front()) {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn bump_version(&mut self) -> String {
        self.next_version += 1;
        self.next_version.to_string()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `error` as the outcome of the next `op` request. Queued errors
    /// are consumed in order, one per request.
    pub fn fail_next(
        &self,
        op: StoreOp,
        error: StoreError,
    ) {
        self.inner.lock().injected.entry(op).or_default().push_back(error);
    }

    /// Seeds a record directly, bypassing call tracking. Assigns a version.
    pub fn insert(
        &self,
        mut record: ResourceRecord,
    ) -> ResourceRecord {
        let mut state = self.inner.lock();
        record.resource_version = Some(state.bump_version());
        state
            .records
            .insert((record.namespace.clone(), record.name.clone()), record.clone());
        record
    }

    pub fn snapshot(
        &self,
        namespace: &str,
        name: &str,
    ) -> Option<ResourceRecord> {
        self.inner
            .lock()
            .records
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn calls(&self) -> Vec<StoreCall> {
        self.inner.lock().calls.clone()
    }

    pub fn count_calls(
        &self,
        op: StoreOp,
    ) -> usize {
        self.inner.lock().calls.iter().filter(|c| c.op == op).count()
    }
}

#[async_trait]
impl ResourceStore for InMemoryStore {
    async fn get(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<ResourceRecord, StoreError> {
        let mut state = self.inner.lock();
        state.begin(StoreOp::Get, Some(namespace), Some(name))?;
        state
            .records
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::not_found(namespace, name))
    }

    async fn create(
        &self,
        record: &ResourceRecord,
    ) -> Result<ResourceRecord, StoreError> {
        let mut state = self.inner.lock();
        state.begin(StoreOp::Create, Some(&record.namespace), Some(&record.name))?;

        let key = (record.namespace.clone(), record.name.clone());
        if state.records.contains_key(&key) {
            return Err(StoreError::AlreadyExists {
                namespace: record.namespace.clone(),
                name: record.name.clone(),
            });
        }

        let mut created = record.clone();
        created.resource_version = Some(state.bump_version());
        state.records.insert(key, created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        record: &ResourceRecord,
    ) -> Result<ResourceRecord, StoreError> {
        let mut state = self.inner.lock();
        state.begin(StoreOp::Update, Some(&record.namespace), Some(&record.name))?;

        let key = (record.namespace.clone(), record.name.clone());
        let current = match state.records.get(&key) {
            Some(r) => r.resource_version.clone(),
            None => return Err(StoreError::not_found(&record.namespace, &record.name)),
        };
        if record.resource_version.is_none() || record.resource_version != current {
            return Err(StoreError::Conflict {
                namespace: record.namespace.clone(),
                name: record.name.clone(),
                message: format!(
                    "submitted version {:?}, stored version {:?}",
                    record.resource_version, current
                ),
            });
        }

        let mut updated = record.clone();
        updated.resource_version = Some(state.bump_version());
        state.records.insert(key, updated.clone());
        Ok(updated)
    }

    async fn delete(
        &self,
        namespace: &str,
        name: &str,
    ) -> Result<(), StoreError> {
        let mut state = self.inner.lock();
        state.begin(StoreOp::Delete, Some(namespace), Some(name))?;
        state
            .records
            .remove(&(namespace.to_string(), name.to_string()))
            .map(|_| ())
            .ok_or_else(|| StoreError::not_found(namespace, name))
    }

    async fn list_all(&self) -> Result<Vec<ResourceRecord>, StoreError> {
        let mut state = self.inner.lock();
        state.begin(StoreOp::List, None, None)?;
        Ok(state.records.values().cloned().collect())
    }
}
