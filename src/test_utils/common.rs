use std::collections::BTreeMap;

use tracing_subscriber::EnvFilter;

use crate::Endpoint;
use crate::RecordPort;
use crate::ResourceRecord;
use crate::SnapshotTranslator;
use crate::TranslateError;

/// Percent-encoded provider URL as the registry stores it.
pub(crate) fn provider_member(
    host: &str,
    port: u16,
    query: &str,
) -> String {
    let url = if query.is_empty() {
        format!("dubbo://{}:{}/org.demo.Greeter", host, port)
    } else {
        format!("dubbo://{}:{}/org.demo.Greeter?{}", host, port, query)
    };
    urlencoding::encode(&url).into_owned()
}

pub(crate) fn record_with_endpoints(
    name: &str,
    namespace: &str,
    addresses: &[&str],
) -> ResourceRecord {
    let mut record = ResourceRecord::new(name, namespace);
    record.spec.hosts = vec![name.to_string()];
    record.spec.ports = vec![RecordPort {
        number: 20880,
        name: "tcp-dubbo".to_string(),
        protocol: "TCP".to_string(),
    }];
    record.spec.endpoints = addresses
        .iter()
        .map(|a| Endpoint {
            address: a.to_string(),
            ports: BTreeMap::from([("tcp-dubbo".to_string(), 20880)]),
            labels: BTreeMap::new(),
        })
        .collect();
    record
}

/// Treats every member as a bare endpoint address and places the record in
/// a fixed namespace. Members starting with `!` are malformed.
pub(crate) struct AddressTranslator {
    pub namespace: String,
}

impl AddressTranslator {
    pub(crate) fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
        }
    }
}

impl SnapshotTranslator for AddressTranslator {
    fn to_record(
        &self,
        service: &str,
        members: &[String],
    ) -> Result<ResourceRecord, TranslateError> {
        if let Some(bad) = members.iter().find(|m| m.starts_with('!')) {
            return Err(TranslateError::MalformedMember {
                service: service.to_string(),
                member: bad.clone(),
                reason: "rejected by test translator".to_string(),
            });
        }
        let addresses: Vec<&str> = members.iter().map(String::as_str).collect();
        Ok(record_with_endpoints(service, &self.namespace, &addresses))
    }
}

static LOGGER_INIT: once_cell::sync::Lazy<()> = once_cell::sync::Lazy::new(|| {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
});

pub fn enable_logger() {
    *LOGGER_INIT;
}
