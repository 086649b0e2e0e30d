//! Local directory backend: objects are files under a root directory.
//!
//! Used for local runs against a mail drop directory and in tests.

use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;

use crate::error::RetrievalError;
use crate::store::traits::BlobStore;

/// Reads `<root>/<key>`. The bucket name is not part of the path.
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, key: &str) -> Option<PathBuf> {
        let rel = Path::new(key);
        let escapes = rel
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if escapes || key.is_empty() {
            return None;
        }
        Some(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    fn name(&self) -> &str {
        "fs"
    }

    async fn get(&self, bucket: &str, key: &str) -> Result<Vec<u8>, RetrievalError> {
        let path = self.resolve(key).ok_or_else(|| RetrievalError::Backend {
            key: key.to_string(),
            reason: "key does not name a path under the store root".into(),
        })?;

        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => RetrievalError::NotFound {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            ErrorKind::PermissionDenied => RetrievalError::AccessDenied {
                bucket: bucket.to_string(),
                key: key.to_string(),
            },
            _ => RetrievalError::Backend {
                key: key.to_string(),
                reason: e.to_string(),
            },
        })
    }
}
