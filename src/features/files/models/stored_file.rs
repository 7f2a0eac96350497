use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Where the bytes of a stored file live. Remote is always tried first;
/// a record belongs to exactly one tier for its whole life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StorageTier {
    /// Object storage bucket, addressed by `path`
    Remote,
    /// Embedded `data:` URL kept in the record itself
    Local,
}

/// Registry record for one uploaded file. Serialized camelCase, the
/// layout of the per-owner registry blob.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    pub id: String,
    pub name: String,
    pub size: u64,
    #[serde(rename = "type")]
    pub content_type: String,
    pub upload_date: DateTime<Utc>,
    pub url: String,
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_url: Option<String>,
}

impl StoredFile {
    pub fn tier(&self) -> StorageTier {
        if self.path.is_some() {
            StorageTier::Remote
        } else {
            StorageTier::Local
        }
    }
}
