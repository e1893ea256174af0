// Blob storage for uploaded submission files
// Keys are opaque, `/`-separated relative paths chosen by the caller

pub mod local;
pub mod memory;

use axum::async_trait;
use thiserror::Error;

pub use local::LocalBlobStore;
pub use memory::MemoryBlobStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("blob '{0}' not found")]
    NotFound(String),
    #[error("invalid blob key '{0}'")]
    InvalidKey(String),
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Key/bytes storage capability consumed by the submission service
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Store `bytes` under `key`, replacing anything already there
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError>;

    /// Read back the bytes stored under `key`
    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError>;

    /// Remove `key`; removing a missing key is not an error
    async fn delete(&self, key: &str) -> Result<(), StorageError>;
}

/// Reject keys that could escape the store root
pub(crate) fn check_key(key: &str) -> Result<(), StorageError> {
    let invalid = key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|segment| segment.is_empty() || segment == "." || segment == "..");
    if invalid {
        return Err(StorageError::InvalidKey(key.to_string()));
    }
    Ok(())
}
