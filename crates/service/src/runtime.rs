//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so binaries can prepare the store
//! location without depending directly on `common`.

use configs::{StorageBackend, StorageConfig};

/// Make sure the file backend has somewhere to write.
pub async fn ensure_env(storage: &StorageConfig) -> anyhow::Result<()> {
    if storage.backend == StorageBackend::File {
        common::env::ensure_data_dir(&storage.path).await?;
    }
    Ok(())
}
