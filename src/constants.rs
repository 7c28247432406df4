// -
// Registry layout

/// First segment of every watched registry path: `/<root>/<service>/<providers>`
pub(crate) const DEFAULT_REGISTRY_ROOT: &str = "dubbo";
pub(crate) const DEFAULT_PROVIDERS_SEGMENT: &str = "providers";

// -
// Resource store

/// Writer identity stamped on every created or updated record
pub(crate) const FIELD_MANAGER: &str = "registry-sync";

/// Namespace used when a provider does not name one
pub(crate) const DEFAULT_NAMESPACE: &str = "dubbo";

pub(crate) const RECORD_PORT_PROTOCOL: &str = "TCP";

/// Provider URL query parameters copied onto endpoint labels
pub(crate) const ENDPOINT_LABEL_KEYS: &[&str] = &["version", "application", "group", "revision"];

/// Provider URL query parameter naming the target namespace
pub(crate) const NAMESPACE_PARAM: &str = "namespace";
