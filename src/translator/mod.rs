//! Snapshot translation: registry children to a resource record
//!
//! Translation is pure. A translator must fail deterministically on
//! malformed members and never touch the store.

mod provider_url;
pub use provider_url::*;


#[cfg(test)]
use mockall::automock;

use crate::ResourceRecord;
use crate::TranslateError;

#[cfg_attr(test, automock)]
pub trait SnapshotTranslator: Send + Sync + 'static {
    /// Builds the record that should represent `service` given its current
    /// registry members. Zero members yield a record with zero endpoints.
    fn to_record(
        &self,
        service: &str,
        members: &[String],
    ) -> std::result::Result<ResourceRecord, TranslateError>;
}
