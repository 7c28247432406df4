use std::collections::BTreeMap;

use url::Url;

use super::SnapshotTranslator;
use crate::constants::ENDPOINT_LABEL_KEYS;
use crate::constants::NAMESPACE_PARAM;
use crate::constants::RECORD_PORT_PROTOCOL;
use crate::Endpoint;
use crate::ReconcileConfig;
use crate::RecordPort;
use crate::ResourceRecord;
use crate::TranslateError;

/// Translates percent-encoded provider URLs, the registry's native child
/// format, e.g.
/// `dubbo%3A%2F%2F10.0.0.1%3A20880%2Forg.demo.Greeter%3Fversion%3D1.0`.
#[derive(Debug, Clone)]
pub struct ProviderUrlTranslator {
    default_namespace: String,
}

#[derive(Debug)]
struct Provider {
    scheme: String,
    host: String,
    port: u16,
    namespace: Option<String>,
    labels: BTreeMap<String, String>,
}

impl ProviderUrlTranslator {
    pub fn new(default_namespace: impl Into<String>) -> Self {
        Self {
            default_namespace: default_namespace.into(),
        }
    }

    pub fn from_config(config: &ReconcileConfig) -> Self {
        Self::new(config.default_namespace.clone())
    }

    fn parse_member(
        service: &str,
        member: &str,
    ) -> Result<Provider, TranslateError> {
        let malformed = |reason: String| TranslateError::MalformedMember {
            service: service.to_string(),
            member: member.to_string(),
            reason,
        };

        let decoded = urlencoding::decode(member).map_err(|e| malformed(e.to_string()))?;
        let url = Url::parse(&decoded).map_err(|e| malformed(e.to_string()))?;

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => return Err(malformed("missing host".to_string())),
        };
        let port =
            explicit_port(&url, &decoded).ok_or_else(|| malformed("missing port".to_string()))?;

        let mut namespace = None;
        let mut labels = BTreeMap::new();
        for (key, value) in url.query_pairs() {
            if key == NAMESPACE_PARAM {
                if !value.is_empty() {
                    namespace = Some(value.to_string());
                }
            } else if ENDPOINT_LABEL_KEYS.contains(&key.as_ref()) {
                labels.insert(key.to_string(), value.to_string());
            }
        }

        Ok(Provider {
            scheme: url.scheme().to_string(),
            host,
            port,
            namespace,
            labels,
        })
    }
}

impl SnapshotTranslator for ProviderUrlTranslator {
    fn to_record(
        &self,
        service: &str,
        members: &[String],
    ) -> Result<ResourceRecord, TranslateError> {
        if service.trim().is_empty() || service.contains('/') {
            return Err(TranslateError::InvalidServiceName(service.to_string()));
        }

        let mut providers = members
            .iter()
            .map(|m| Self::parse_member(service, m))
            .collect::<Result<Vec<_>, _>>()?;
        providers.sort_by(|a, b| (&a.host, a.port).cmp(&(&b.host, b.port)));

        let mut namespace: Option<&str> = None;
        for p in &providers {
            let ns = p.namespace.as_deref().unwrap_or(&self.default_namespace);
            match namespace {
                None => namespace = Some(ns),
                Some(first) if first != ns => {
                    return Err(TranslateError::NamespaceConflict {
                        service: service.to_string(),
                        first: first.to_string(),
                        second: ns.to_string(),
                    });
                }
                Some(_) => {}
            }
        }

        let name = service.to_lowercase();
        let mut record = ResourceRecord::new(
            name.clone(),
            namespace.unwrap_or(&self.default_namespace).to_string(),
        );
        record.spec.hosts = vec![name];

        if let Some(first) = providers.first() {
            record.spec.ports = vec![RecordPort {
                number: first.port,
                name: port_name(&first.scheme),
                protocol: RECORD_PORT_PROTOCOL.to_string(),
            }];
        }

        record.spec.endpoints = providers
            .into_iter()
            .map(|p| Endpoint {
                ports: BTreeMap::from([(port_name(&p.scheme), p.port)]),
                address: p.host,
                labels: p.labels,
            })
            .collect();

        Ok(record)
    }
}

fn port_name(scheme: &str) -> String {
    format!("tcp-{}", scheme)
}

/// Port written in the member itself. `Url` drops a port equal to the scheme
/// default, so that case is recovered from the raw authority.
fn explicit_port(
    url: &Url,
    raw: &str,
) -> Option<u16> {
    if let Some(port) = url.port() {
        return Some(port);
    }
    let authority = raw.split_once("://")?.1;
    let authority = authority.split(['/', '?', '#']).next()?;
    let host_port = authority.rsplit('@').next()?;
    let after_host = host_port.rsplit(']').next()?;
    if after_host.contains(':') {
        url.port_or_known_default()
    } else {
        None
    }
}
