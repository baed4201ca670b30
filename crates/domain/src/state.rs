//! Typed access to the persisted seen-set

use std::sync::Arc;

use crate::model::{PostId, SeenSet};
use crate::ports::{BlobStore, StateError};
use crate::retry::RetryPolicy;

/// Location of the seen-set blob
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobLocation {
    pub bucket: String,
    pub key: String,
}

impl BlobLocation {
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}

/// Loads and saves the seen-set as a JSON array in one blob
pub struct SeenSetRepo<B: BlobStore + ?Sized> {
    store: Arc<B>,
    location: BlobLocation,
    retry: RetryPolicy,
}

impl<B: BlobStore + ?Sized> SeenSetRepo<B> {
    pub fn new(store: Arc<B>, location: BlobLocation, retry: RetryPolicy) -> Self {
        Self {
            store,
            location,
            retry,
        }
    }

    pub fn location(&self) -> &BlobLocation {
        &self.location
    }

    pub async fn load(&self) -> Result<SeenSet, StateError> {
        let BlobLocation { bucket, key } = &self.location;
        let bytes = self
            .retry
            .run("load_state", || self.store.load(bucket, key))
            .await?;

        let ids: Vec<PostId> =
            serde_json::from_slice(&bytes).map_err(|e| StateError::Corrupt(e.to_string()))?;
        let raw_len = ids.len();
        let seen = SeenSet::from_ids(ids);

        if seen.len() < raw_len {
            tracing::warn!(
                bucket = %bucket,
                key = %key,
                duplicates = raw_len - seen.len(),
                "State blob contained duplicate IDs"
            );
        }

        tracing::debug!(bucket = %bucket, key = %key, count = seen.len(), "Loaded seen-set");
        Ok(seen)
    }

    pub async fn save(&self, seen: &SeenSet) -> Result<(), StateError> {
        let BlobLocation { bucket, key } = &self.location;
        let bytes = seen
            .to_json()
            .map_err(|e| StateError::Corrupt(e.to_string()))?;

        self.retry
            .run("save_state", || self.store.save(bucket, key, &bytes))
            .await?;

        tracing::debug!(bucket = %bucket, key = %key, count = seen.len(), "Saved seen-set");
        Ok(())
    }
}
