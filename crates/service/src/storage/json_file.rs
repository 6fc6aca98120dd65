use std::{collections::HashMap, path::{Path, PathBuf}, sync::Arc};

use async_trait::async_trait;
use tokio::{fs, sync::RwLock};
use tracing::warn;

use super::{check_quota, KvStore};
use crate::errors::StorageFault;

/// JSON file-backed key-value store.
///
/// Keeps the whole key space in memory as a `HashMap<String, String>` and
/// rewrites the file on every mutation. A mutation whose write fails is
/// rolled back, so memory and disk never disagree.
#[derive(Debug)]
pub struct JsonFileKvStore {
    inner: RwLock<HashMap<String, String>>,
    file_path: PathBuf,
    quota: Option<u64>,
}

impl JsonFileKvStore {
    /// Open the store at `path`. Creates the file with an empty map if
    /// missing; an unreadable file starts out empty and is overwritten on
    /// the next write.
    pub async fn new<P: Into<PathBuf>>(path: P, quota: Option<u64>) -> Result<Arc<Self>, StorageFault> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| StorageFault::Write(e.to_string()))?;
        }

        let map: HashMap<String, String> = match fs::read(&file_path).await {
            Ok(bytes) => serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                warn!(path = %file_path.display(), error = %e, "store file is corrupt; starting empty");
                HashMap::new()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: HashMap<String, String> = HashMap::new();
                Self::persist(&file_path, &empty).await?;
                empty
            }
            Err(e) => return Err(StorageFault::Read(e.to_string())),
        };

        Ok(Arc::new(Self { inner: RwLock::new(map), file_path, quota }))
    }

    // Written to a sibling temp file then renamed over the target.
    async fn persist(file_path: &Path, map: &HashMap<String, String>) -> Result<(), StorageFault> {
        let data = serde_json::to_vec(map).map_err(|e| StorageFault::Serialize(e.to_string()))?;
        let tmp = file_path.with_extension("json.tmp");
        fs::write(&tmp, data).await.map_err(|e| StorageFault::Write(e.to_string()))?;
        fs::rename(&tmp, file_path).await.map_err(|e| StorageFault::Write(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for JsonFileKvStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageFault> {
        let map = self.inner.read().await;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: String) -> Result<(), StorageFault> {
        let mut map = self.inner.write().await;
        check_quota(&map, key, &value, self.quota)?;
        let previous = map.insert(key.to_string(), value);
        if let Err(e) = Self::persist(&self.file_path, &map).await {
            match previous {
                Some(old) => map.insert(key.to_string(), old),
                None => map.remove(key),
            };
            return Err(e);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StorageFault> {
        let mut map = self.inner.write().await;
        let Some(previous) = map.remove(key) else { return Ok(()) };
        if let Err(e) = Self::persist(&self.file_path, &map).await {
            map.insert(key.to_string(), previous);
            return Err(e);
        }
        Ok(())
    }
}
