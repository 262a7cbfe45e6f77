//! File-backed key/value store.
//!
//! All keys live in one JSON object, e.g. `{"last_order_id": "A1"}`. Writes go
//! to a sibling `.tmp` file which is then renamed over the original, so a
//! crash mid-write leaves the previous contents intact.

use super::{KeyValueStore, StorageError};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

pub struct FileStore {
    path: PathBuf,
    // Serialises read-modify-write cycles from this process.
    write_lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_all(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match fs::read(&self.path).await {
            Ok(bytes) if bytes.is_empty() => Ok(BTreeMap::new()),
            Ok(bytes) => serde_json::from_slice(&bytes)
                .map_err(|e| StorageError::Serialization(e.to_string())),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(StorageError::Io(e.to_string())),
        }
    }
}

#[async_trait]
impl KeyValueStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.read_all().await?.remove(key))
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.write_lock.lock().await;

        let mut entries = self.read_all().await?;
        entries.insert(key.to_string(), value.to_string());
        let bytes = serde_json::to_vec_pretty(&entries)
            .map_err(|e| StorageError::Serialization(e.to_string()))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::Io(e.to_string()))?;
        }

        let temp_path = self.path.with_extension("tmp");
        fs::write(&temp_path, bytes)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;
        fs::rename(&temp_path, &self.path)
            .await
            .map_err(|e| StorageError::Io(e.to_string()))?;

        tracing::debug!(path = %self.path.display(), key, "Stored");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::LAST_ORDER_KEY;

    #[tokio::test]
    async fn test_missing_file_reads_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get(LAST_ORDER_KEY).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_survives_new_instance() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.json");

        let store = FileStore::new(&path);
        store.set(LAST_ORDER_KEY, "A1").await.unwrap();
        store.set("other", "x").await.unwrap();
        store.set(LAST_ORDER_KEY, "B2").await.unwrap();

        let reopened = FileStore::new(&path);
        assert_eq!(
            reopened.get(LAST_ORDER_KEY).await.unwrap().as_deref(),
            Some("B2")
        );
        assert_eq!(reopened.get("other").await.unwrap().as_deref(), Some("x"));
        assert!(!path.with_extension("tmp").exists());
    }

    #[tokio::test]
    async fn test_corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.json");
        std::fs::write(&path, b"not json").unwrap();

        let store = FileStore::new(&path);
        assert!(matches!(
            store.get(LAST_ORDER_KEY).await,
            Err(StorageError::Serialization(_))
        ));
    }
}
