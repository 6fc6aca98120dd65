//! Storage abstractions for the service layer
//!
//! `KvStore` is the port `RequestStore` writes through: a string-keyed,
//! string-valued store with whole-call atomicity for each get/set/remove.
//! Backends live in the submodules; [`open`] picks one from config.

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use configs::{StorageBackend, StorageConfig};

use crate::errors::StorageFault;

pub mod json_file;
pub mod memory;
pub mod unavailable;

pub use json_file::JsonFileKvStore;
pub use memory::MemoryKvStore;
pub use unavailable::UnavailableKvStore;

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageFault>;
    async fn set(&self, key: &str, value: String) -> Result<(), StorageFault>;
    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> Result<(), StorageFault>;
}

/// Build the backend named by `cfg`.
pub async fn open(cfg: &StorageConfig) -> Result<Arc<dyn KvStore>, StorageFault> {
    let store: Arc<dyn KvStore> = match cfg.backend {
        StorageBackend::File => JsonFileKvStore::new(&cfg.path, cfg.quota()).await?,
        StorageBackend::Memory => Arc::new(MemoryKvStore::with_quota(cfg.quota())),
        StorageBackend::Unavailable => Arc::new(UnavailableKvStore),
    };
    Ok(store)
}

fn entry_bytes(key: &str, value: &str) -> u64 {
    (key.len() + value.len()) as u64
}

/// Reject a `set` that would push the map's total key+value bytes past `quota`.
pub(crate) fn check_quota(
    map: &HashMap<String, String>,
    key: &str,
    value: &str,
    quota: Option<u64>,
) -> Result<(), StorageFault> {
    let Some(quota) = quota else { return Ok(()) };
    let current: u64 = map.iter().map(|(k, v)| entry_bytes(k, v)).sum();
    let replaced = map.get(key).map_or(0, |old| entry_bytes(key, old));
    let needed = current - replaced + entry_bytes(key, value);
    if needed > quota {
        return Err(StorageFault::QuotaExceeded { needed, quota });
    }
    Ok(())
}
