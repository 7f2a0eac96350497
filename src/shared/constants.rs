/// Route a share link points at when a file cannot be served
pub const FILE_UNAVAILABLE_ROUTE: &str = "/file-not-available";

/// Namespace prefix for per-owner registry keys (`files_<ownerId>`)
pub const REGISTRY_KEY_PREFIX: &str = "files_";

/// Extension used for storage keys when the upload name has none
pub const DEFAULT_FILE_EXTENSION: &str = "bin";

/// Content type assumed when the client does not send one
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Upload progress entries older than this are pruned
pub const UPLOAD_PROGRESS_TTL_SECS: i64 = 600;

// =============================================================================
// PLAN DEFAULTS
// =============================================================================

pub const FREE_STORAGE_LIMIT: u64 = 524_288_000; // 500MB
pub const FREE_MAX_FILE_SIZE: u64 = 104_857_600; // 100MB
pub const FREE_RETENTION_DAYS: u32 = 7;

pub const PRO_STORAGE_LIMIT: u64 = 26_843_545_600; // 25GB
pub const PRO_MAX_FILE_SIZE: u64 = 2_147_483_648; // 2GB
pub const PRO_RETENTION_DAYS: u32 = 30;

pub const BUSINESS_STORAGE_LIMIT: u64 = 107_374_182_400; // 100GB
pub const BUSINESS_MAX_FILE_SIZE: u64 = 10_737_418_240; // 10GB
pub const BUSINESS_RETENTION_DAYS: u32 = 365;
