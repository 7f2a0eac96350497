use async_trait::async_trait;

use crate::core::error::Result;
use crate::features::files::models::StoredFile;
use crate::shared::constants::REGISTRY_KEY_PREFIX;

/// Key under which an owner's file list is kept
pub fn registry_key(owner_id: &str) -> String {
    format!("{}{}", REGISTRY_KEY_PREFIX, owner_id)
}

/// Per-owner ordered list of file records.
///
/// Every write is a read-modify-write of the owner's whole list and must be
/// atomic with respect to other writes for the same owner: two concurrent
/// appends both end up in the list.
#[async_trait]
pub trait FileRegistry: Send + Sync {
    /// Records in insertion order. Unknown owners have an empty list.
    async fn list(&self, owner_id: &str) -> Result<Vec<StoredFile>>;

    async fn append(&self, owner_id: &str, file: StoredFile) -> Result<()>;

    /// Remove the record with `file_id`, returning it if it was present
    async fn remove(&self, owner_id: &str, file_id: &str) -> Result<Option<StoredFile>>;

    /// Look a record up by id across all owners
    async fn find(&self, file_id: &str) -> Result<Option<StoredFile>>;
}
