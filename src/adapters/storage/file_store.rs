use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use crate::ports::{SnapshotStorage, StorageError, StorageResult};

/// File-backed snapshot storage: each key maps to one JSON file under
/// the data directory.
pub struct FileStorage {
    data_dir: PathBuf,
}

impl FileStorage {
    /// Store snapshots under the platform data directory.
    pub fn new() -> StorageResult<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| StorageError::ReadError("Cannot determine data directory".to_string()))?
            .join("taskmaster");
        Ok(Self { data_dir })
    }

    pub fn with_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn blob_path(&self, key: &str) -> PathBuf {
        self.data_dir.join(format!("{key}.json"))
    }

    async fn ensure_data_dir(&self) -> StorageResult<()> {
        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| StorageError::WriteError(e.to_string()))
    }
}

#[async_trait]
impl SnapshotStorage for FileStorage {
    async fn load(&self, key: &str) -> StorageResult<Option<String>> {
        match fs::read_to_string(self.blob_path(key)).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(StorageError::ReadError(e.to_string())),
        }
    }

    async fn save(&self, key: &str, value: &str) -> StorageResult<()> {
        self.ensure_data_dir().await?;
        fs::write(self.blob_path(key), value)
            .await
            .map_err(|e| StorageError::WriteError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_load_missing_key_returns_none() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_dir(temp_dir.path());
        assert!(storage.load("tasks").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_then_load_round_trips() {
        let temp_dir = TempDir::new().unwrap();
        let storage = FileStorage::with_dir(temp_dir.path());

        storage.save("tasks", r#"{"version":1,"tasks":[]}"#).await.unwrap();
        let loaded = storage.load("tasks").await.unwrap();
        assert_eq!(loaded.as_deref(), Some(r#"{"version":1,"tasks":[]}"#));
    }

    #[tokio::test]
    async fn test_save_creates_missing_directories() {
        let temp_dir = TempDir::new().unwrap();
        let nested = temp_dir.path().join("deeply").join("nested");
        let storage = FileStorage::with_dir(&nested);

        storage.save("tasks", "[]").await.unwrap();
        assert_eq!(storage.load("tasks").await.unwrap().as_deref(), Some("[]"));
    }

    #[tokio::test]
    async fn test_blobs_survive_new_instances() {
        let temp_dir = TempDir::new().unwrap();

        {
            let storage = FileStorage::with_dir(temp_dir.path());
            storage.save("tasks", "persisted").await.unwrap();
        }

        let storage = FileStorage::with_dir(temp_dir.path());
        assert_eq!(
            storage.load("tasks").await.unwrap().as_deref(),
            Some("persisted")
        );
    }
}
