//! JSON file-backed key-value store.
//!
//! The whole map is loaded on open and rewritten atomically (temp file +
//! rename) on every `set`.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::fs;
use tokio::sync::{Mutex, RwLock};

use super::{KvStore, StoreError};

const STORE_FILE: &str = "store.json";

#[derive(Clone)]
pub struct FileKvStore {
    path: PathBuf,
    entries: Arc<RwLock<BTreeMap<String, String>>>,
    persist_lock: Arc<Mutex<()>>,
}

impl FileKvStore {
    /// Open (or create) the store inside `base_dir`.
    ///
    /// A corrupt or unreadable file is logged and replaced by an empty map.
    pub async fn open(base_dir: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_dir = base_dir.as_ref();
        fs::create_dir_all(base_dir)
            .await
            .map_err(|source| StoreError::Io {
                path: base_dir.to_path_buf(),
                source,
            })?;
        let path = base_dir.join(STORE_FILE);
        let entries = match fs::read(&path).await {
            Ok(bytes) => match serde_json::from_slice::<BTreeMap<String, String>>(&bytes) {
                Ok(entries) => entries,
                Err(e) => {
                    tracing::warn!("Failed to parse store {}: {}", path.display(), e);
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => {
                tracing::warn!("Failed to read store {}: {}", path.display(), err);
                BTreeMap::new()
            }
        };
        tracing::debug!("Opened store {} ({} keys)", path.display(), entries.len());

        Ok(Self {
            path,
            entries: Arc::new(RwLock::new(entries)),
            persist_lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self) -> Result<(), StoreError> {
        let _guard = self.persist_lock.lock().await;
        let data = serde_json::to_vec_pretty(&*self.entries.read().await)?;
        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, data)
            .await
            .map_err(|source| StoreError::Io {
                path: tmp_path.clone(),
                source,
            })?;
        fs::rename(&tmp_path, &self.path)
            .await
            .map_err(|source| StoreError::Io {
                path: self.path.clone(),
                source,
            })?;
        Ok(())
    }
}

#[async_trait]
impl KvStore for FileKvStore {
    fn is_persistent(&self) -> bool {
        true
    }

    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        self.persist().await
    }
}
