use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::features::files::models::{StorageTier, StoredFile};
use crate::features::files::services::UploadProgress;
use crate::shared::format::{file_category, file_type_icon, format_file_size, FileCategory, FileIcon};

/// Upload file request DTO for OpenAPI documentation.
/// The handler reads the multipart body directly.
#[derive(Debug, ToSchema)]
#[allow(dead_code)]
pub struct UploadFileDto {
    /// The file to upload
    #[schema(format = Binary, content_media_type = "application/octet-stream")]
    pub file: String,
}

/// Query parameters for listing files
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListFilesQuery {
    /// Case-insensitive substring of the file name
    pub search: Option<String>,
    /// Only files of this category
    pub category: Option<FileCategory>,
}

/// A stored file as shown on the dashboard
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FileResponseDto {
    pub id: String,
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Human readable size, e.g. "1.5 KB"
    #[schema(example = "1.5 KB")]
    pub size_label: String,
    pub content_type: String,
    pub icon: FileIcon,
    pub category: FileCategory,
    pub upload_date: DateTime<Utc>,
    /// Public URL for remote files, `data:` URL for local ones
    pub url: String,
    pub tier: StorageTier,
    /// Object key in the bucket, remote files only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl From<StoredFile> for FileResponseDto {
    fn from(file: StoredFile) -> Self {
        Self {
            size_label: format_file_size(file.size),
            icon: file_type_icon(&file.content_type, &file.name),
            category: file_category(&file.content_type),
            tier: file.tier(),
            id: file.id,
            name: file.name,
            size: file.size,
            content_type: file.content_type,
            upload_date: file.upload_date,
            url: file.url,
            path: file.path,
        }
    }
}

/// Result of an upload
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadResultDto {
    pub file: FileResponseDto,
    pub tier: StorageTier,
    /// Present when the file could not go to remote storage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Share link of a file
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ShareLinkDto {
    pub file_id: String,
    /// Public URL, `data:` URL, or the unavailable route
    pub url: String,
    /// Whether `url` resolves to the file
    pub available: bool,
    /// Stable public route that serves the file from whichever tier holds it
    pub share_url: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UploadProgressDto {
    pub upload_id: String,
    #[schema(minimum = 0, maximum = 100)]
    pub percent: u8,
    pub updated_at: DateTime<Utc>,
}

impl UploadProgressDto {
    pub fn new(upload_id: String, progress: UploadProgress) -> Self {
        Self {
            upload_id,
            percent: progress.percent,
            updated_at: progress.updated_at,
        }
    }
}

/// Response DTO for delete operations
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteFileResponseDto {
    /// Confirmation that the file was deleted
    pub deleted: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_carries_display_fields() {
        let file = StoredFile {
            id: "f1".to_string(),
            name: "photo.jpg".to_string(),
            size: 1536,
            content_type: "image/jpeg".to_string(),
            upload_date: Utc::now(),
            url: "https://cdn/u/f1.jpg".to_string(),
            owner_id: "u".to_string(),
            path: Some("u/f1.jpg".to_string()),
            local_url: None,
        };

        let dto = FileResponseDto::from(file);
        assert_eq!(dto.size_label, "1.5 KB");
        assert_eq!(dto.icon, FileIcon::Image);
        assert_eq!(dto.category, FileCategory::Images);
        assert_eq!(dto.tier, StorageTier::Remote);
        assert_eq!(dto.path.as_deref(), Some("u/f1.jpg"));
    }
}
