//! Storage module for file management
//!
//! Remote object storage behind the `ObjectStore` trait, with an
//! S3-compatible implementation.

mod minio_client;
mod object_store;
mod progress_reader;
mod sigv4;

pub use minio_client::MinIOClient;
pub use object_store::{ObjectStore, StorageError, TransferProgress};
