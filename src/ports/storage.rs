use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Failed to read from storage: {0}")]
    ReadError(String),

    #[error("Failed to write to storage: {0}")]
    WriteError(String),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Durable key-value collaborator holding one serialized blob per key.
///
/// The store reads its key once at startup and writes the whole blob
/// back after every mutation; durability is best-effort.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SnapshotStorage: Send + Sync {
    /// Read the blob stored under `key`, or `None` if absent.
    async fn load(&self, key: &str) -> StorageResult<Option<String>>;

    /// Replace the blob stored under `key`.
    async fn save(&self, key: &str, value: &str) -> StorageResult<()>;
}
