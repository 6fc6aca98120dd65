//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;

use tracing::{debug, warn};

/// Ensure the parent directory of the store file exists.
pub async fn ensure_data_dir(store_path: &Path) -> anyhow::Result<()> {
    let Some(dir) = store_path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        debug!(path = %store_path.display(), "store file has no parent directory; nothing to create");
        return Ok(());
    };
    if tokio::fs::metadata(dir).await.is_err() {
        warn!(dir = %dir.display(), "data directory missing; creating it");
    }
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", dir.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn creates_missing_parent() -> Result<(), anyhow::Error> {
        let root = std::env::temp_dir().join(format!("relief_env_{}", uuid::Uuid::new_v4()));
        let file = root.join("nested").join("store.json");
        ensure_data_dir(&file).await?;
        assert!(tokio::fs::metadata(root.join("nested")).await?.is_dir());
        ensure_data_dir(Path::new("store.json")).await?;
        let _ = tokio::fs::remove_dir_all(&root).await;
        Ok(())
    }
}
