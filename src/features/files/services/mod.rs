pub mod file_service;
pub mod upload_progress;

pub use file_service::{FileService, SaveOutcome, ShareLink, UploadBlob};
pub use upload_progress::{ProgressFn, ProgressReporter, UploadProgress, UploadProgressTracker};
