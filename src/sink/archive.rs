//! Blob store event archive over `object_store`

use super::EventArchive;
use crate::error::Result;
use crate::storage::StorageLocation;
use async_trait::async_trait;
use bytes::Bytes;

/// Archive writing one object per event into a storage location
#[derive(Debug, Clone)]
pub struct ObjectStoreArchive {
    location: StorageLocation,
}

impl ObjectStoreArchive {
    /// Archive rooted at a storage location
    pub fn new(location: StorageLocation) -> Self {
        Self { location }
    }

    /// Archive rooted at an S3 bucket
    pub fn s3(bucket: &str, region: &str) -> Result<Self> {
        Ok(Self::new(StorageLocation::s3_bucket(bucket, region)?))
    }

    /// The underlying location
    pub fn location(&self) -> &StorageLocation {
        &self.location
    }
}

#[async_trait]
impl EventArchive for ObjectStoreArchive {
    async fn put_object(&self, key: &str, payload: Bytes) -> Result<String> {
        self.location.put(key, payload).await
    }
}
