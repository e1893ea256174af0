// In-process blob store

use std::collections::HashMap;
use std::sync::RwLock;

use axum::async_trait;

use super::{check_key, BlobStore, StorageError};

/// Keeps blobs in a map; contents are lost when the process exits
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.blobs.read().map(|b| b.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &str) -> bool {
        self.blobs.read().map(|b| b.contains_key(key)).unwrap_or(false)
    }
}

fn poisoned() -> StorageError {
    StorageError::Io(std::io::Error::new(
        std::io::ErrorKind::Other,
        "blob map lock poisoned",
    ))
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn put(&self, key: &str, bytes: &[u8]) -> Result<(), StorageError> {
        check_key(key)?;
        self.blobs
            .write()
            .map_err(|_| poisoned())?
            .insert(key.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        check_key(key)?;
        self.blobs
            .read()
            .map_err(|_| poisoned())?
            .get(key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(key.to_string()))
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        check_key(key)?;
        self.blobs.write().map_err(|_| poisoned())?.remove(key);
        Ok(())
    }
}
