use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::upload_progress::{ProgressFn, ProgressReporter, UploadProgressTracker};
use crate::core::config::UploadConfig;
use crate::core::error::{AppError, Result};
use crate::features::files::models::StoredFile;
use crate::features::files::registry::FileRegistry;
use crate::modules::storage::{ObjectStore, TransferProgress};
use crate::shared::constants::{
    DEFAULT_CONTENT_TYPE, DEFAULT_FILE_EXTENSION, FILE_UNAVAILABLE_ROUTE,
};
use crate::shared::data_url;
use crate::shared::format::{file_category, FileCategory};
use crate::shared::ids::generate_file_id;

const STORAGE_UNAVAILABLE: &str = "Remote storage is unavailable";
const UPLOAD_FAILED: &str = "Upload to remote storage failed";
const STORAGE_UNAVAILABLE_NOTICE: &str =
    "Remote storage is unavailable, the file was saved locally";
const UPLOAD_FAILED_NOTICE: &str = "Upload to remote storage failed, the file was saved locally";

/// A file as received from the client
#[derive(Debug, Clone)]
pub struct UploadBlob {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Result of `FileService::save`
#[derive(Debug, Clone)]
pub struct SaveOutcome {
    pub file: StoredFile,
    /// Set when the remote tier was skipped or failed
    pub notice: Option<String>,
}

/// Where a share link for a record points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShareLink {
    Remote(String),
    Local(String),
    Unavailable,
}

impl ShareLink {
    pub fn url(&self) -> &str {
        match self {
            ShareLink::Remote(url) | ShareLink::Local(url) => url,
            ShareLink::Unavailable => FILE_UNAVAILABLE_ROUTE,
        }
    }

    pub fn is_available(&self) -> bool {
        !matches!(self, ShareLink::Unavailable)
    }
}

/// Storage key of a file: `{owner_id}/{file_id}.{ext}`
pub fn storage_key(owner_id: &str, file_id: &str, file_name: &str) -> String {
    format!("{}/{}.{}", owner_id, file_id, file_extension(file_name))
}

/// Lowercased extension of `file_name`, `bin` when there is none
fn file_extension(file_name: &str) -> String {
    file_name
        .rsplit_once('.')
        .map(|(stem, ext)| (stem, ext.trim()))
        .filter(|(stem, ext)| {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_else(|| DEFAULT_FILE_EXTENSION.to_string())
}

/// Saves uploads to remote storage with a local fallback, and keeps the
/// per-owner registry in step
pub struct FileService {
    store: Arc<dyn ObjectStore>,
    registry: Arc<dyn FileRegistry>,
    progress: Arc<UploadProgressTracker>,
    limits: UploadConfig,
    public_base_url: String,
}

impl FileService {
    pub fn new(
        store: Arc<dyn ObjectStore>,
        registry: Arc<dyn FileRegistry>,
        limits: UploadConfig,
        public_base_url: String,
    ) -> Self {
        Self {
            store,
            registry,
            progress: Arc::new(UploadProgressTracker::new()),
            limits,
            public_base_url,
        }
    }

    pub fn progress_tracker(&self) -> &Arc<UploadProgressTracker> {
        &self.progress
    }

    pub fn max_upload_size(&self) -> usize {
        self.limits.max_upload_size
    }

    /// Public route serving a record regardless of its tier
    pub fn share_url(&self, file_id: &str) -> String {
        format!("{}/share/{}", self.public_base_url, file_id)
    }

    fn validate(&self, blob: &UploadBlob) -> Result<()> {
        if blob.name.trim().is_empty() {
            return Err(AppError::Validation("File name is required".to_string()));
        }
        if blob.data.is_empty() {
            return Err(AppError::Validation("File is empty".to_string()));
        }
        if blob.data.len() > self.limits.max_upload_size {
            return Err(AppError::PayloadTooLarge(format!(
                "File too large. Maximum size is {} bytes",
                self.limits.max_upload_size
            )));
        }
        Ok(())
    }

    /// Persist a blob, remote tier first, and record it for `owner_id`.
    ///
    /// Progress goes 0 (start), 10 (bucket checked), 10-90 (transfer),
    /// 100 (recorded). It only moves back, to 0, when the save fails.
    pub async fn save(
        &self,
        blob: UploadBlob,
        owner_id: &str,
        on_progress: Option<ProgressFn>,
    ) -> Result<SaveOutcome> {
        self.validate(&blob)?;

        let reporter = Arc::new(ProgressReporter::new(on_progress));
        let file_id = generate_file_id();
        let key = storage_key(owner_id, &file_id, &blob.name);
        let content_type = if blob.content_type.trim().is_empty() {
            DEFAULT_CONTENT_TYPE.to_string()
        } else {
            blob.content_type.clone()
        };

        reporter.report(0);
        let bucket_ready = self.store.bucket_exists().await;
        reporter.report(10);

        let mut notice = None;
        let mut fallback_reason = STORAGE_UNAVAILABLE;
        let mut path = None;

        if bucket_ready {
            let transfer: TransferProgress = {
                let reporter = Arc::clone(&reporter);
                Arc::new(move |sent, total| {
                    let percent = if total == 0 {
                        90
                    } else {
                        10 + (sent.min(total) * 80 / total) as u8
                    };
                    reporter.report(percent);
                })
            };

            match self
                .store
                .upload(&key, &blob.data, &content_type, Some(transfer))
                .await
            {
                Ok(stored_key) => {
                    reporter.report(90);
                    path = Some(stored_key);
                }
                Err(e) => {
                    warn!("Remote upload of '{}' failed, saving locally: {}", key, e);
                    notice = Some(UPLOAD_FAILED_NOTICE.to_string());
                    fallback_reason = UPLOAD_FAILED;
                }
            }
        } else {
            warn!(
                "Bucket '{}' unavailable, saving '{}' locally",
                self.store.bucket_name(),
                blob.name
            );
            notice = Some(STORAGE_UNAVAILABLE_NOTICE.to_string());
        }

        let (url, local_url) = match &path {
            Some(stored_key) => (self.store.public_url(stored_key), None),
            None => {
                let inline =
                    self.encode_inline(&content_type, &blob.data, fallback_reason, &reporter)?;
                (inline.clone(), Some(inline))
            }
        };

        let file = StoredFile {
            id: file_id,
            name: blob.name,
            size: blob.data.len() as u64,
            content_type,
            upload_date: Utc::now(),
            url,
            owner_id: owner_id.to_string(),
            path,
            local_url,
        };

        if let Err(e) = self.registry.append(owner_id, file.clone()).await {
            reporter.reset();
            if let Some(stored_key) = &file.path {
                if let Err(cleanup) = self.store.delete(stored_key).await {
                    warn!("Failed to remove unrecorded object '{}': {}", stored_key, cleanup);
                }
            }
            return Err(e);
        }
        reporter.report(100);

        info!(
            "Saved file id={} owner={} tier={:?} size={}",
            file.id,
            owner_id,
            file.tier(),
            file.size
        );

        Ok(SaveOutcome { file, notice })
    }

    fn encode_inline(
        &self,
        content_type: &str,
        data: &[u8],
        fallback_reason: &str,
        reporter: &ProgressReporter,
    ) -> Result<String> {
        let needed = data_url::encoded_len(content_type, data.len());
        if needed > self.limits.max_inline_size {
            reporter.reset();
            return Err(AppError::ExternalServiceError(format!(
                "{} and the file is too large to keep locally ({} bytes, limit {})",
                fallback_reason, needed, self.limits.max_inline_size
            )));
        }

        reporter.report(40);
        let encoded = data_url::encode(content_type, data);
        reporter.report(70);
        Ok(encoded)
    }

    /// Files of `owner_id` in upload order, optionally filtered by a
    /// case-insensitive name search and a category
    pub async fn list(
        &self,
        owner_id: &str,
        search: Option<&str>,
        category: Option<FileCategory>,
    ) -> Result<Vec<StoredFile>> {
        let needle = search
            .map(|s| s.trim().to_lowercase())
            .filter(|s| !s.is_empty());

        let files = self.registry.list(owner_id).await?;
        debug!("Owner {} has {} files", owner_id, files.len());

        Ok(files
            .into_iter()
            .filter(|f| {
                needle
                    .as_ref()
                    .map_or(true, |n| f.name.to_lowercase().contains(n.as_str()))
            })
            .filter(|f| category.map_or(true, |c| file_category(&f.content_type) == c))
            .collect())
    }

    async fn owned_file(&self, owner_id: &str, file_id: &str) -> Result<StoredFile> {
        self.registry
            .list(owner_id)
            .await?
            .into_iter()
            .find(|f| f.id == file_id)
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))
    }

    /// Remove a file. Remote deletion is best effort; the record goes
    /// either way.
    pub async fn delete(&self, owner_id: &str, file_id: &str) -> Result<StoredFile> {
        let file = self.owned_file(owner_id, file_id).await?;

        if let Some(path) = file.path.as_deref().filter(|p| !p.is_empty()) {
            if let Err(e) = self.store.delete(path).await {
                warn!("Failed to delete '{}' from remote storage: {}", path, e);
            }
        }

        let removed = self
            .registry
            .remove(owner_id, file_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("File {} not found", file_id)))?;

        info!("Deleted file id={} owner={}", file_id, owner_id);
        Ok(removed)
    }

    /// Resolve the link a stored file can be shared with
    pub async fn shareable_link(&self, path: Option<&str>, local_url: Option<&str>) -> ShareLink {
        if let Some(path) = path.filter(|p| !p.is_empty()) {
            if self.store.bucket_exists().await {
                return ShareLink::Remote(self.store.public_url(path));
            }
        }

        match local_url.filter(|u| !u.is_empty()) {
            Some(url) => ShareLink::Local(url.to_string()),
            None => ShareLink::Unavailable,
        }
    }

    /// Share link of one of the owner's files
    pub async fn link_for(&self, owner_id: &str, file_id: &str) -> Result<(StoredFile, ShareLink)> {
        let file = self.owned_file(owner_id, file_id).await?;
        let link = self
            .shareable_link(file.path.as_deref(), file.local_url.as_deref())
            .await;
        Ok((file, link))
    }

    /// Share link of any file by id, for the public share route
    pub async fn resolve_shared(&self, file_id: &str) -> Result<Option<(StoredFile, ShareLink)>> {
        let Some(file) = self.registry.find(file_id).await? else {
            return Ok(None);
        };
        let link = self
            .shareable_link(file.path.as_deref(), file.local_url.as_deref())
            .await;
        Ok(Some((file, link)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::files::models::StorageTier;
    use crate::features::files::registry::InMemoryFileRegistry;
    use crate::shared::test_helpers::InMemoryObjectStore;
    use async_trait::async_trait;
    use std::sync::Mutex;

    const OWNER: &str = "owner-1";

    fn limits() -> UploadConfig {
        UploadConfig {
            max_upload_size: 1024 * 1024,
            max_inline_size: 64 * 1024,
        }
    }

    fn service_with(store: Arc<InMemoryObjectStore>) -> FileService {
        FileService::new(
            store,
            Arc::new(InMemoryFileRegistry::new()),
            limits(),
            "http://localhost:3000".to_string(),
        )
    }

    fn blob(name: &str, size: usize) -> UploadBlob {
        UploadBlob {
            name: name.to_string(),
            content_type: "application/pdf".to_string(),
            data: vec![42u8; size],
        }
    }

    fn recording() -> (ProgressFn, Arc<Mutex<Vec<u8>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let callback: ProgressFn = Arc::new(move |p| sink.lock().unwrap().push(p));
        (callback, seen)
    }

    fn assert_non_decreasing(values: &[u8]) {
        assert!(
            values.windows(2).all(|w| w[0] <= w[1]),
            "progress went backwards: {:?}",
            values
        );
    }

    #[test]
    fn test_storage_key_uses_lowercased_extension() {
        assert_eq!(storage_key("u", "abc", "Report.PDF"), "u/abc.pdf");
        assert_eq!(storage_key("u", "abc", "archive.tar.gz"), "u/abc.gz");
        assert_eq!(storage_key("u", "abc", "README"), "u/abc.bin");
        assert_eq!(storage_key("u", "abc", ".env"), "u/abc.bin");
        assert_eq!(storage_key("u", "abc", "trailing."), "u/abc.bin");
    }

    #[tokio::test]
    async fn test_save_remote_when_bucket_available() {
        let store = Arc::new(InMemoryObjectStore::available());
        let service = service_with(Arc::clone(&store));
        let (callback, seen) = recording();

        let outcome = service
            .save(blob("report.pdf", 2048), OWNER, Some(callback))
            .await
            .unwrap();

        let file = outcome.file;
        assert_eq!(file.tier(), StorageTier::Remote);
        assert!(outcome.notice.is_none());
        let path = file.path.clone().unwrap();
        assert!(path.starts_with("owner-1/"));
        assert!(path.ends_with(".pdf"));
        assert!(file.local_url.is_none());
        assert_eq!(
            file.url,
            format!("https://files.example.com/file_storage/{}", path)
        );
        assert_eq!(file.size, 2048);
        assert_eq!(store.object_count(), 1);

        let progress = seen.lock().unwrap().clone();
        assert_non_decreasing(&progress);
        assert_eq!(progress.first(), Some(&0));
        assert_eq!(progress.last(), Some(&100));
        assert!(progress.contains(&50));
    }

    #[tokio::test]
    async fn test_save_falls_back_when_bucket_missing() {
        let store = Arc::new(InMemoryObjectStore::without_bucket());
        let service = service_with(Arc::clone(&store));
        let (callback, seen) = recording();

        let outcome = service
            .save(blob("notes.pdf", 100), OWNER, Some(callback))
            .await
            .unwrap();

        let file = outcome.file;
        assert_eq!(file.tier(), StorageTier::Local);
        assert!(file.path.is_none());
        let local = file.local_url.clone().unwrap();
        assert!(local.starts_with("data:application/pdf;base64,"));
        assert_eq!(file.url, local);
        assert!(outcome.notice.is_some());
        assert_eq!(store.object_count(), 0);

        let progress = seen.lock().unwrap().clone();
        assert_non_decreasing(&progress);
        assert_eq!(progress.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_save_falls_back_when_upload_fails() {
        let store = Arc::new(InMemoryObjectStore::failing_uploads());
        let service = service_with(store);
        let (callback, seen) = recording();

        let outcome = service
            .save(blob("notes.pdf", 100), OWNER, Some(callback))
            .await
            .unwrap();

        assert!(outcome.file.path.is_none());
        assert!(outcome.file.local_url.is_some());
        assert_eq!(outcome.notice.as_deref(), Some(UPLOAD_FAILED_NOTICE));

        let progress = seen.lock().unwrap().clone();
        assert_non_decreasing(&progress);
        assert_eq!(progress.last(), Some(&100));
    }

    #[tokio::test]
    async fn test_oversized_blob_without_bucket_is_rejected() {
        let store = Arc::new(InMemoryObjectStore::without_bucket());
        let service = service_with(store);
        let (callback, seen) = recording();

        let result = service
            .save(blob("big.pdf", 100 * 1024), OWNER, Some(callback))
            .await;

        match result {
            Err(AppError::ExternalServiceError(message)) => {
                assert!(message.starts_with(STORAGE_UNAVAILABLE), "{}", message)
            }
            other => panic!("expected ExternalServiceError, got {:?}", other.map(|o| o.file)),
        }
        assert_eq!(seen.lock().unwrap().last(), Some(&0));
        assert!(service.list(OWNER, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversized_blob_after_failed_upload_names_the_failure() {
        let store = Arc::new(InMemoryObjectStore::failing_uploads());
        let service = service_with(store);

        let result = service.save(blob("big.pdf", 100 * 1024), OWNER, None).await;

        match result {
            Err(AppError::ExternalServiceError(message)) => {
                assert!(message.starts_with(UPLOAD_FAILED), "{}", message);
                assert!(message.contains("too large to keep locally"));
            }
            other => panic!("expected ExternalServiceError, got {:?}", other.map(|o| o.file)),
        }
        assert!(service.list(OWNER, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_validation_happens_before_storage() {
        let service = service_with(Arc::new(InMemoryObjectStore::available()));

        let empty_name = service.save(blob("  ", 10), OWNER, None).await;
        assert!(matches!(empty_name, Err(AppError::Validation(_))));

        let empty_data = service.save(blob("a.pdf", 0), OWNER, None).await;
        assert!(matches!(empty_data, Err(AppError::Validation(_))));

        let too_big = service.save(blob("a.pdf", 1024 * 1024 + 1), OWNER, None).await;
        assert!(matches!(too_big, Err(AppError::PayloadTooLarge(_))));
    }

    #[tokio::test]
    async fn test_sequential_uploads_listed_in_order() {
        let service = service_with(Arc::new(InMemoryObjectStore::available()));

        let first = service.save(blob("one.pdf", 10), OWNER, None).await.unwrap();
        let second = service.save(blob("two.pdf", 10), OWNER, None).await.unwrap();

        let ids: Vec<String> = service
            .list(OWNER, None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.id)
            .collect();
        assert_eq!(ids, vec![first.file.id, second.file.id]);
    }

    #[tokio::test]
    async fn test_list_filters_by_search_and_category() {
        let service = service_with(Arc::new(InMemoryObjectStore::available()));
        let mut photo = blob("Holiday.PNG", 10);
        photo.content_type = "image/png".to_string();

        service.save(photo, OWNER, None).await.unwrap();
        service.save(blob("holiday-plan.pdf", 10), OWNER, None).await.unwrap();
        service.save(blob("taxes.pdf", 10), OWNER, None).await.unwrap();

        let found = service.list(OWNER, Some("HOLIDAY"), None).await.unwrap();
        assert_eq!(found.len(), 2);

        let images = service
            .list(OWNER, Some("holiday"), Some(FileCategory::Images))
            .await
            .unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].name, "Holiday.PNG");

        let documents = service
            .list(OWNER, None, Some(FileCategory::Documents))
            .await
            .unwrap();
        assert_eq!(documents.len(), 2);

        let everything = service.list(OWNER, Some("   "), None).await.unwrap();
        assert_eq!(everything.len(), 3);
    }

    #[tokio::test]
    async fn test_delete_removes_remote_object_and_record() {
        let store = Arc::new(InMemoryObjectStore::available());
        let service = service_with(Arc::clone(&store));
        let saved = service.save(blob("a.pdf", 10), OWNER, None).await.unwrap();

        service.delete(OWNER, &saved.file.id).await.unwrap();

        assert_eq!(store.deleted_keys(), vec![saved.file.path.unwrap()]);
        assert!(service.list(OWNER, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_survives_remote_failure() {
        let store = Arc::new(InMemoryObjectStore::failing_deletes());
        let service = service_with(Arc::clone(&store));
        let saved = service.save(blob("a.pdf", 10), OWNER, None).await.unwrap();

        service.delete(OWNER, &saved.file.id).await.unwrap();

        assert!(store.deleted_keys().is_empty());
        assert!(service.list(OWNER, None, None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_unknown_or_foreign_file_is_not_found() {
        let service = service_with(Arc::new(InMemoryObjectStore::available()));
        let saved = service.save(blob("a.pdf", 10), OWNER, None).await.unwrap();

        assert!(matches!(
            service.delete(OWNER, "missing").await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.delete("someone-else", &saved.file.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.list(OWNER, None, None).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shareable_link_variants() {
        let service = service_with(Arc::new(InMemoryObjectStore::available()));

        assert_eq!(
            service.shareable_link(Some("u/a.pdf"), None).await,
            ShareLink::Remote("https://files.example.com/file_storage/u/a.pdf".to_string())
        );
        assert_eq!(
            service.shareable_link(Some(""), Some("data:text/plain;base64,aGk=")).await,
            ShareLink::Local("data:text/plain;base64,aGk=".to_string())
        );

        let unavailable = service.shareable_link(None, None).await;
        assert_eq!(unavailable, ShareLink::Unavailable);
        assert_eq!(unavailable.url(), FILE_UNAVAILABLE_ROUTE);
    }

    #[tokio::test]
    async fn test_shareable_link_skips_remote_without_bucket() {
        let service = service_with(Arc::new(InMemoryObjectStore::without_bucket()));

        assert_eq!(
            service.shareable_link(Some("u/a.pdf"), None).await,
            ShareLink::Unavailable
        );
        assert_eq!(
            service.shareable_link(Some("u/a.pdf"), Some("data:,x")).await,
            ShareLink::Local("data:,x".to_string())
        );
    }

    #[tokio::test]
    async fn test_resolve_shared_finds_any_owner() {
        let service = service_with(Arc::new(InMemoryObjectStore::without_bucket()));
        let saved = service.save(blob("a.pdf", 10), OWNER, None).await.unwrap();

        let (file, link) = service.resolve_shared(&saved.file.id).await.unwrap().unwrap();
        assert_eq!(file.owner_id, OWNER);
        assert!(matches!(link, ShareLink::Local(_)));

        assert!(service.resolve_shared("missing").await.unwrap().is_none());
        assert_eq!(
            service.share_url("abc"),
            "http://localhost:3000/share/abc"
        );
    }

    struct FailingRegistry;

    #[async_trait]
    impl FileRegistry for FailingRegistry {
        async fn list(&self, _owner_id: &str) -> Result<Vec<StoredFile>> {
            Ok(Vec::new())
        }

        async fn append(&self, _owner_id: &str, _file: StoredFile) -> Result<()> {
            Err(AppError::Internal("registry offline".to_string()))
        }

        async fn remove(&self, _owner_id: &str, _file_id: &str) -> Result<Option<StoredFile>> {
            Ok(None)
        }

        async fn find(&self, _file_id: &str) -> Result<Option<StoredFile>> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_registry_failure_resets_progress() {
        let store = Arc::new(InMemoryObjectStore::available());
        let service = FileService::new(
            Arc::clone(&store) as Arc<dyn ObjectStore>,
            Arc::new(FailingRegistry),
            limits(),
            "http://localhost:3000".to_string(),
        );
        let (callback, seen) = recording();

        let result = service.save(blob("a.pdf", 10), OWNER, Some(callback)).await;

        assert!(matches!(result, Err(AppError::Internal(_))));
        assert_eq!(seen.lock().unwrap().last(), Some(&0));
        assert_eq!(store.object_count(), 0);
        assert_eq!(store.deleted_keys().len(), 1);
    }
}
