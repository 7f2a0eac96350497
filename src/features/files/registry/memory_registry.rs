use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use super::file_registry::{registry_key, FileRegistry};
use crate::core::error::Result;
use crate::features::files::models::StoredFile;

/// Process-local registry. Contents are lost on restart.
#[derive(Default)]
pub struct InMemoryFileRegistry {
    entries: RwLock<HashMap<String, Vec<StoredFile>>>,
}

impl InMemoryFileRegistry {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl FileRegistry for InMemoryFileRegistry {
    async fn list(&self, owner_id: &str) -> Result<Vec<StoredFile>> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(&registry_key(owner_id))
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, owner_id: &str, file: StoredFile) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.entry(registry_key(owner_id)).or_default().push(file);
        Ok(())
    }

    async fn remove(&self, owner_id: &str, file_id: &str) -> Result<Option<StoredFile>> {
        let mut entries = self.entries.write().await;
        let Some(files) = entries.get_mut(&registry_key(owner_id)) else {
            return Ok(None);
        };

        match files.iter().position(|f| f.id == file_id) {
            Some(index) => Ok(Some(files.remove(index))),
            None => Ok(None),
        }
    }

    async fn find(&self, file_id: &str) -> Result<Option<StoredFile>> {
        let entries = self.entries.read().await;
        Ok(entries
            .values()
            .flat_map(|files| files.iter())
            .find(|f| f.id == file_id)
            .cloned())
    }
}
