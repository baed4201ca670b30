//! In-memory blob store for testing and offline runs

use async_trait::async_trait;
use report_notifier_domain::{BlobStore, StateError};
use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

/// In-memory blob store implementation
pub struct InMemoryBlobStore {
    blobs: RwLock<HashMap<(String, String), Vec<u8>>>,
    writes: AtomicUsize,
}

impl InMemoryBlobStore {
    pub fn new() -> Self {
        Self {
            blobs: RwLock::new(HashMap::new()),
            writes: AtomicUsize::new(0),
        }
    }

    /// Create a store pre-seeded with one blob
    pub fn with_blob(bucket: &str, key: &str, value: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        if let Ok(mut blobs) = store.blobs.write() {
            blobs.insert(Self::make_key(bucket, key), value.into());
        }
        store
    }

    /// Current contents of a blob, if present
    pub fn get(&self, bucket: &str, key: &str) -> Option<Vec<u8>> {
        self.blobs
            .read()
            .ok()
            .and_then(|blobs| blobs.get(&Self::make_key(bucket, key)).cloned())
    }

    /// Number of successful `save` calls
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn make_key(bucket: &str, key: &str) -> (String, String) {
        (bucket.to_string(), key.to_string())
    }
}

impl Default for InMemoryBlobStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BlobStore for InMemoryBlobStore {
    async fn load(&self, bucket: &str, key: &str) -> Result<Vec<u8>, StateError> {
        let blobs = self
            .blobs
            .read()
            .map_err(|e| StateError::Connection(e.to_string()))?;
        blobs
            .get(&Self::make_key(bucket, key))
            .cloned()
            .ok_or_else(|| StateError::NotFound(format!("{}/{}", bucket, key)))
    }

    async fn save(&self, bucket: &str, key: &str, value: &[u8]) -> Result<(), StateError> {
        let mut blobs = self
            .blobs
            .write()
            .map_err(|e| StateError::Connection(e.to_string()))?;
        blobs.insert(Self::make_key(bucket, key), value.to_vec());
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blob_roundtrip() {
        let store = InMemoryBlobStore::new();

        store.save("bucket", "seen.json", b"[\"1\"]").await.unwrap();
        let loaded = store.load("bucket", "seen.json").await.unwrap();

        assert_eq!(loaded, b"[\"1\"]".to_vec());
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_blob_is_not_found() {
        let store = InMemoryBlobStore::with_blob("bucket", "seen.json", "[]");

        let result = store.load("other-bucket", "seen.json").await;
        assert!(matches!(result, Err(StateError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_save_overwrites() {
        let store = InMemoryBlobStore::with_blob("bucket", "seen.json", "[]");

        store.save("bucket", "seen.json", b"[1]").await.unwrap();

        assert_eq!(store.get("bucket", "seen.json"), Some(b"[1]".to_vec()));
    }
}
