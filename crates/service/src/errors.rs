use thiserror::Error;

/// Everything that can go wrong between typed records and stored strings.
///
/// `RequestStore` absorbs these; they only escape from the raw
/// [`KvStore`](crate::storage::KvStore) backends.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageFault {
    #[error("storage is not available in this environment")]
    Unavailable,
    #[error("storage read failed: {0}")]
    Read(String),
    #[error("storage write failed: {0}")]
    Write(String),
    #[error("storage quota exceeded: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: u64, quota: u64 },
    #[error("serialize error: {0}")]
    Serialize(String),
    #[error("stored value is corrupt: {0}")]
    Deserialize(String),
}

impl StorageFault {
    pub fn is_unavailable(&self) -> bool { matches!(self, Self::Unavailable) }
}
