//! Object-store backend using the AWS SDK.

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::operation::get_object::GetObjectError;

use crate::error::RetrievalError;
use crate::store::traits::BlobStore;

/// Reads raw emails from S3.
pub struct S3BlobStore {
    client: aws_sdk_s3::Client,
}

impl S3BlobStore {
    pub fn new(client: aws_sdk_s3::Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS environment (region, credentials).
    pub async fn from_env() -> Self {
        let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(aws_sdk_s3::Client::new(&sdk_config))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn name(&self) -> &str {
        "s3"
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError> {
        let resp = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| classify_error(bucket, key, e))?;

        let data = resp.body.collect().await.map_err(|e| RetrievalError::Backend {
            key: key.to_string(),
            reason: format!("body read failed: {e}"),
        })?;

        Ok(data.into_bytes().to_vec())
    }
}

fn classify_error(bucket: &str, key: &str, err: SdkError<GetObjectError>) -> RetrievalError {
    if err.as_service_error().is_some_and(|e| e.is_no_such_key()) {
        return RetrievalError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        };
    }

    match err.raw_response().map(|r| r.status().as_u16()) {
        Some(404) => RetrievalError::NotFound {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        Some(403) => RetrievalError::AccessDenied {
            bucket: bucket.to_string(),
            key: key.to_string(),
        },
        _ => RetrievalError::Backend {
            key: key.to_string(),
            reason: DisplayErrorContext(&err).to_string(),
        },
    }
}
