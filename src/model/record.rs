use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

/// Mesh control-plane record describing the reachable providers of one
/// registry service.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Mesh-wide routing key, one record per name across all namespaces
    pub name: String,
    pub namespace: String,
    /// Opaque optimistic-concurrency token assigned by the store.
    /// Required on update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_version: Option<String>,
    /// Writer that last created or updated the record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub managed_by: Option<String>,
    pub spec: RecordSpec,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordSpec {
    pub hosts: Vec<String>,
    /// Operator-owned routing metadata; carried over verbatim on update
    pub ports: Vec<RecordPort>,
    /// Membership derived from the registry children
    pub endpoints: Vec<Endpoint>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPort {
    pub number: u16,
    pub name: String,
    pub protocol: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    #[serde(default)]
    pub ports: BTreeMap<String, u16>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
}

impl ResourceRecord {
    pub fn new(
        name: impl Into<String>,
        namespace: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            namespace: namespace.into(),
            ..Default::default()
        }
    }

    pub fn has_endpoints(&self) -> bool {
        !self.spec.endpoints.is_empty()
    }

    /// Takes the routing fields and version token of `existing`, keeping only
    /// the membership-derived fields of `self`.
    pub fn carry_routing_from(
        &mut self,
        existing: &ResourceRecord,
    ) {
        self.spec.ports = existing.spec.ports.clone();
        self.resource_version = existing.resource_version.clone();
    }

    /// JSON rendering used in log lines; falls back to Debug output.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| format!("{:?}", self))
    }
}
