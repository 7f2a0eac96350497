use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::shared::constants::UPLOAD_PROGRESS_TTL_SECS;

/// Progress callback, called with a percentage in `0..=100`
pub type ProgressFn = Arc<dyn Fn(u8) + Send + Sync>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Forwards progress to a callback, dropping any value lower than the last
/// one reported. Only `reset` may move progress back.
pub struct ProgressReporter {
    last: Mutex<Option<u8>>,
    callback: Option<ProgressFn>,
}

impl ProgressReporter {
    pub fn new(callback: Option<ProgressFn>) -> Self {
        Self {
            last: Mutex::new(None),
            callback,
        }
    }

    pub fn report(&self, percent: u8) {
        let percent = percent.min(100);
        let mut last = lock(&self.last);
        if last.is_some_and(|previous| percent <= previous) {
            return;
        }
        *last = Some(percent);
        drop(last);

        if let Some(callback) = &self.callback {
            callback(percent);
        }
    }

    /// Back to 0 after an unrecoverable failure
    pub fn reset(&self) {
        *lock(&self.last) = Some(0);
        if let Some(callback) = &self.callback {
            callback(0);
        }
    }
}

/// Latest progress of one tracked upload
#[derive(Debug, Clone, PartialEq)]
pub struct UploadProgress {
    pub owner_id: String,
    pub percent: u8,
    pub updated_at: DateTime<Utc>,
}

/// In-memory store of upload progress keyed by owner and the client's
/// upload id, so two owners may reuse the same id
#[derive(Default)]
pub struct UploadProgressTracker {
    entries: Mutex<HashMap<(String, String), UploadProgress>>,
}

impl UploadProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, upload_id: &str, owner_id: &str, percent: u8) {
        let now = Utc::now();
        let cutoff = now - Duration::seconds(UPLOAD_PROGRESS_TTL_SECS);

        let mut entries = lock(&self.entries);
        entries.retain(|_, entry| entry.updated_at >= cutoff);
        entries.insert(
            (owner_id.to_string(), upload_id.to_string()),
            UploadProgress {
                owner_id: owner_id.to_string(),
                percent,
                updated_at: now,
            },
        );
    }

    /// Progress of `upload_id`, visible only to the owner who started it
    pub fn get(&self, upload_id: &str, owner_id: &str) -> Option<UploadProgress> {
        lock(&self.entries)
            .get(&(owner_id.to_string(), upload_id.to_string()))
            .cloned()
    }

    /// Callback that records every report under `upload_id`
    pub fn callback_for(self: &Arc<Self>, upload_id: &str, owner_id: &str) -> ProgressFn {
        let tracker = Arc::clone(self);
        let upload_id = upload_id.to_string();
        let owner_id = owner_id.to_string();
        Arc::new(move |percent| tracker.record(&upload_id, &owner_id, percent))
    }

    #[cfg(test)]
    fn insert_at(&self, upload_id: &str, owner_id: &str, percent: u8, at: DateTime<Utc>) {
        lock(&self.entries).insert(
            (owner_id.to_string(), upload_id.to_string()),
            UploadProgress {
                owner_id: owner_id.to_string(),
                percent,
                updated_at: at,
            },
        );
    }
}
