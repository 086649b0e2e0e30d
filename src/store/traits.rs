//! `BlobStore` trait: single async read interface over object storage.

use async_trait::async_trait;

use crate::error::RetrievalError;

/// Read-only view of the external blob store.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Backend name for logging (e.g. "s3", "fs").
    fn name(&self) -> &str;

    /// Fetch the object at `bucket`/`key`.
    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError>;
}
