use dashmap::DashMap;

/// Local cache of where each service's record lives.
///
/// An entry means a record with that name is believed to exist in that
/// namespace. A missing entry proves nothing: deletion falls back to a store
/// scan for unindexed names. Entries are sharded by name, so watches of
/// unrelated services never contend on one lock.
#[derive(Debug, Default)]
pub struct MembershipIndex {
    entries: DashMap<String, String>,
}

impl MembershipIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn namespace_of(
        &self,
        name: &str,
    ) -> Option<String> {
        self.entries.get(name).map(|ns| ns.value().clone())
    }

    /// Returns the namespace previously indexed for `name`, if any.
    pub fn record(
        &self,
        name: &str,
        namespace: &str,
    ) -> Option<String> {
        self.entries.insert(name.to_string(), namespace.to_string())
    }

    /// Removes the entry only while it still points at `namespace`, so a
    /// late cleanup cannot erase a newer placement.
    pub fn forget_if(
        &self,
        name: &str,
        namespace: &str,
    ) -> bool {
        self.entries.remove_if(name, |_, ns| ns == namespace).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
