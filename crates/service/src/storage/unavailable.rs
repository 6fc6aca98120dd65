use async_trait::async_trait;

use super::KvStore;
use crate::errors::StorageFault;

/// Stand-in for environments with no storage facility (headless
/// rendering, locked-down hosts). Every call fails with
/// [`StorageFault::Unavailable`].
#[derive(Debug, Default, Clone, Copy)]
pub struct UnavailableKvStore;

#[async_trait]
impl KvStore for UnavailableKvStore {
    async fn get(&self, _key: &str) -> Result<Option<String>, StorageFault> {
        Err(StorageFault::Unavailable)
    }

    async fn set(&self, _key: &str, _value: String) -> Result<(), StorageFault> {
        Err(StorageFault::Unavailable)
    }

    async fn remove(&self, _key: &str) -> Result<(), StorageFault> {
        Err(StorageFault::Unavailable)
    }
}
