//! Registry Sync Error Hierarchy
//!
//! Errors are grouped by the collaborator that produced them so the retry
//! wrapper can decide, without string matching, whether another attempt is
//! worth making.

use std::time::Duration;

use config::ConfigError;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Resource store failures (get/create/update/delete/list)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Registry children could not be converted into a resource record
    #[error(transparent)]
    Translate(#[from] TranslateError),

    /// Registry watch failures that outlived the watch retry policy
    #[error(transparent)]
    Registry(#[from] RegistryError),

    /// Configuration source or deserialization failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration loaded but failed validation
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("{0}")]
    SignalSenderClosed(String),

    /// Shutdown was observed while a blocking helper was still waiting
    #[error("Shutdown signal received")]
    Exit,

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

impl Error {
    /// Only store failures can be transient. Translation is deterministic for
    /// the same registry data and the rest are local problems.
    pub fn is_retryable(&self) -> bool {
        match self {
            Error::Store(e) => e.is_retryable(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Store(e) if e.is_not_found())
    }
}

/// Store error classification, modelled on the status reasons a declarative
/// API server reports.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Resource {namespace}/{name} not found")]
    NotFound { namespace: String, name: String },

    #[error("Resource {namespace}/{name} already exists")]
    AlreadyExists { namespace: String, name: String },

    /// Optimistic concurrency failure: the submitted version token is stale
    #[error("Version conflict on {namespace}/{name}: {message}")]
    Conflict {
        namespace: String,
        name: String,
        message: String,
    },

    #[error("Store internal error: {0}")]
    InternalError(String),

    #[error("Store server timeout: {0}")]
    ServerTimeout(String),

    #[error("Store request timeout after {0:?}")]
    Timeout(Duration),

    #[error("Store unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Too many requests: {0}")]
    TooManyRequests(String),

    #[error("Resource version expired: {0}")]
    ResourceExpired(String),

    /// The store answered without a recognizable reason
    #[error("Unknown store error: {0}")]
    Unknown(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// The submitted record was rejected as malformed
    #[error("Invalid resource: {0}")]
    Invalid(String),

    #[error("Store error: {0}")]
    Other(String),
}

impl StoreError {
    pub fn not_found(
        namespace: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        StoreError::NotFound {
            namespace: namespace.into(),
            name: name.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound { .. })
    }

    /// Transient failures worth another reconciliation attempt. Every attempt
    /// re-reads the current record, so a version conflict resolves itself.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            StoreError::Conflict { .. }
                | StoreError::InternalError(_)
                | StoreError::ServerTimeout(_)
                | StoreError::Timeout(_)
                | StoreError::ServiceUnavailable(_)
                | StoreError::TooManyRequests(_)
                | StoreError::ResourceExpired(_)
                | StoreError::Unknown(_)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TranslateError {
    /// A registry child could not be decoded into a provider address
    #[error("Malformed member {member:?} of service {service}: {reason}")]
    MalformedMember {
        service: String,
        member: String,
        reason: String,
    },

    /// Providers of one service disagree on the target namespace
    #[error("Service {service} has providers in namespaces {first} and {second}")]
    NamespaceConflict {
        service: String,
        first: String,
        second: String,
    },

    #[error("Invalid service name: {0:?}")]
    InvalidServiceName(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// A single watch call failed; the adapter retries these
    #[error("Failed to watch registry path {path}: {reason}")]
    WatchFailed { path: String, reason: String },

    /// The bounded watch retry policy ran out
    #[error("Gave up watching registry path {path} after {attempts} attempts")]
    WatchExhausted { path: String, attempts: usize },
}
