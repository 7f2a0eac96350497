use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
    #[error("Object already exists: {0}")]
    AlreadyExists(String),
    #[error("Upload failed: {0}")]
    Upload(String),
    #[error("Delete failed: {0}")]
    Delete(String),
    #[error("Storage configuration error: {0}")]
    Config(String),
}

/// Transfer progress callback, called with `(bytes_sent, total_bytes)`
pub type TransferProgress = Arc<dyn Fn(u64, u64) + Send + Sync>;

/// Remote object storage holding uploaded file bytes
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket_name(&self) -> String;

    /// Whether the bucket exists. Unreachable storage reports `false`.
    async fn bucket_exists(&self) -> bool;

    async fn create_bucket(&self) -> Result<(), StorageError>;

    /// Store `data` under `key`. Fails with `AlreadyExists` rather than
    /// overwriting an existing object. Returns the key.
    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
        on_progress: Option<TransferProgress>,
    ) -> Result<String, StorageError>;

    /// Public URL of an object. Pure, no request is made.
    fn public_url(&self, key: &str) -> String;

    async fn delete(&self, key: &str) -> Result<(), StorageError>;

    /// Check the bucket, creating it when allowed. Returns whether the
    /// bucket is usable afterwards.
    async fn ensure_bucket(&self, create_if_missing: bool) -> bool {
        if self.bucket_exists().await {
            return true;
        }

        if !create_if_missing {
            warn!(
                "Bucket '{}' does not exist or is not accessible",
                self.bucket_name()
            );
            return false;
        }

        match self.create_bucket().await {
            Ok(()) => {
                info!("Bucket '{}' created", self.bucket_name());
                true
            }
            Err(e) => {
                warn!("Could not create bucket '{}': {}", self.bucket_name(), e);
                false
            }
        }
    }
}
