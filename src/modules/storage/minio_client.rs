//! S3-compatible storage client (MinIO, Supabase storage S3 endpoint, AWS)
//!
//! Uses the rust-s3 crate for object operations and a small SigV4 signer
//! for the bucket policy request the crate does not cover.

use async_trait::async_trait;
use chrono::Utc;
use reqwest::{Client, Url};
use s3::creds::Credentials;
use s3::{Bucket, BucketConfiguration, Region};
use serde_json::json;
use std::io::Cursor;
use tracing::{debug, info, warn};

use super::object_store::{ObjectStore, StorageError, TransferProgress};
use super::progress_reader::ProgressReader;
use super::sigv4::SigV4Signer;
use crate::core::config::StorageConfig;

/// S3-compatible storage client bound to a single bucket
pub struct MinIOClient {
    bucket: Box<Bucket>,
    region: Region,
    credentials: Credentials,
    endpoint: String,
    public_endpoint: String,
    signer: SigV4Signer,
    /// HTTP client for bucket policy operations
    http_client: Client,
}

impl MinIOClient {
    /// Build the client. No request is made here; storage being down at
    /// startup only means uploads take the local tier.
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        let credentials = Credentials::new(
            Some(&config.access_key),
            Some(&config.secret_key),
            None,
            None,
            None,
        )
        .map_err(|e| StorageError::Config(format!("Failed to create credentials: {}", e)))?;

        let region = Region::Custom {
            region: config.region.clone(),
            endpoint: config.endpoint.clone(),
        };

        let mut bucket = Bucket::new(&config.bucket, region.clone(), credentials.clone())
            .map_err(|e| StorageError::Config(format!("Failed to create bucket handle: {}", e)))?;

        // Path-style URLs (http://endpoint/bucket) work for MinIO and Supabase
        bucket.set_path_style();
        bucket.add_header(
            "Cache-Control",
            &format!("max-age={}", config.cache_control_secs),
        );

        let http_client = Client::builder()
            .build()
            .map_err(|e| StorageError::Config(format!("Failed to create HTTP client: {}", e)))?;

        let signer = SigV4Signer::new(&config.access_key, &config.secret_key, &config.region, "s3");

        info!(
            "Storage client configured for endpoint: {}, bucket: {}",
            config.endpoint,
            bucket.name()
        );

        Ok(Self {
            bucket,
            region,
            credentials,
            endpoint: config.endpoint,
            public_endpoint: config.public_endpoint,
            signer,
            http_client,
        })
    }

    /// Allow anonymous reads on the bucket so public URLs resolve.
    ///
    /// Failure is logged, not returned: the policy can be set by hand.
    pub async fn set_public_read_policy(&self) {
        let bucket_name = self.bucket.name();
        let policy = json!({
            "Version": "2012-10-17",
            "Statement": [
                {
                    "Effect": "Allow",
                    "Principal": {"AWS": "*"},
                    "Action": ["s3:GetObject"],
                    "Resource": [format!("arn:aws:s3:::{bucket_name}/*")]
                }
            ]
        })
        .to_string();

        match self.put_bucket_policy(&bucket_name, &policy).await {
            Ok(()) => info!("Set public read policy for bucket '{}'", bucket_name),
            Err(e) => warn!(
                "Failed to set bucket policy for '{}': {}. Public links will not resolve \
                 until read access is granted manually.",
                bucket_name, e
            ),
        }
    }

    async fn put_bucket_policy(&self, bucket_name: &str, policy: &str) -> Result<(), StorageError> {
        let endpoint_url = Url::parse(&self.endpoint)
            .map_err(|e| StorageError::Config(format!("Invalid endpoint URL: {}", e)))?;
        let host = endpoint_url
            .host_str()
            .ok_or_else(|| StorageError::Config("Endpoint URL has no host".to_string()))?;
        let host_header = match endpoint_url.port() {
            Some(p) => format!("{}:{}", host, p),
            None => host.to_string(),
        };

        let signed = self.signer.sign(
            "PUT",
            &format!("/{}", bucket_name),
            "policy=",
            &host_header,
            policy.as_bytes(),
            Utc::now(),
        )?;

        let response = self
            .http_client
            .put(format!("{}/{}?policy", self.endpoint, bucket_name))
            .header("Host", &host_header)
            .header("x-amz-date", &signed.amz_date)
            .header("x-amz-content-sha256", &signed.payload_hash)
            .header("Authorization", &signed.authorization)
            .header("Content-Type", "application/json")
            .body(policy.to_string())
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(format!("Policy request failed: {}", e)))?;

        if response.status().is_success() {
            Ok(())
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(StorageError::Config(format!(
                "Bucket policy rejected: {} - {}",
                status, body
            )))
        }
    }

    /// Whether an object already exists under `key`
    async fn object_exists(&self, key: &str) -> Result<bool, StorageError> {
        match self.bucket.head_object(key).await {
            Ok((_, code)) => Ok(code == 200),
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("404") || error_str.contains("NoSuchKey") {
                    Ok(false)
                } else {
                    Err(StorageError::Unavailable(format!(
                        "Failed to check object '{}': {}",
                        key, e
                    )))
                }
            }
        }
    }
}

/// Encode each path segment of an object key for use in a URL
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[async_trait]
impl ObjectStore for MinIOClient {
    fn bucket_name(&self) -> String {
        self.bucket.name()
    }

    async fn bucket_exists(&self) -> bool {
        match self.bucket.exists().await {
            Ok(exists) => {
                debug!("Bucket '{}' exists: {}", self.bucket.name(), exists);
                exists
            }
            Err(e) => {
                warn!(
                    "Could not reach storage to check bucket '{}': {}",
                    self.bucket.name(),
                    e
                );
                false
            }
        }
    }

    async fn create_bucket(&self) -> Result<(), StorageError> {
        let result = Bucket::create_with_path_style(
            &self.bucket.name(),
            self.region.clone(),
            self.credentials.clone(),
            BucketConfiguration::default(),
        )
        .await;

        match result {
            Ok(response) if response.success() => Ok(()),
            Ok(response) => {
                let body = response.response_text;
                if body.contains("BucketAlreadyOwnedByYou") || body.contains("BucketAlreadyExists")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                    Ok(())
                } else {
                    Err(StorageError::Unavailable(format!(
                        "Create bucket returned {}: {}",
                        response.response_code, body
                    )))
                }
            }
            Err(e) => {
                let error_str = e.to_string();
                if error_str.contains("BucketAlreadyOwnedByYou")
                    || error_str.contains("BucketAlreadyExists")
                    || error_str.contains("already own it")
                {
                    debug!("Bucket '{}' already exists", self.bucket.name());
                    Ok(())
                } else {
                    Err(StorageError::Unavailable(format!(
                        "Failed to create bucket '{}': {}",
                        self.bucket.name(),
                        e
                    )))
                }
            }
        }
    }

    async fn upload(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
        on_progress: Option<TransferProgress>,
    ) -> Result<String, StorageError> {
        if self.object_exists(key).await? {
            return Err(StorageError::AlreadyExists(key.to_string()));
        }

        let total = data.len() as u64;
        let mut reader = ProgressReader::new(Cursor::new(data), total, on_progress);

        let response = self
            .bucket
            .put_object_stream_with_content_type(&mut reader, key, content_type)
            .await
            .map_err(|e| StorageError::Upload(format!("Failed to upload '{}': {}", key, e)))?;

        let code = response.status_code();
        if !(200..300).contains(&code) {
            return Err(StorageError::Upload(format!(
                "Upload of '{}' returned status {}",
                key, code
            )));
        }

        debug!(
            "Uploaded '{}' ({} bytes) to bucket '{}'",
            key,
            reader.bytes_sent(),
            self.bucket.name()
        );
        Ok(key.to_string())
    }

    fn public_url(&self, key: &str) -> String {
        format!(
            "{}/{}/{}",
            self.public_endpoint,
            self.bucket.name(),
            encode_key(key)
        )
    }

    async fn delete(&self, key: &str) -> Result<(), StorageError> {
        let response = self
            .bucket
            .delete_object(key)
            .await
            .map_err(|e| StorageError::Delete(format!("Failed to delete '{}': {}", key, e)))?;

        let code = response.status_code();
        if !(200..300).contains(&code) {
            return Err(StorageError::Delete(format!(
                "Delete of '{}' returned status {}",
                key, code
            )));
        }

        debug!("Deleted '{}' from bucket '{}'", key, self.bucket.name());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> StorageConfig {
        StorageConfig {
            endpoint: "http://localhost:9000".to_string(),
            public_endpoint: "https://files.example.com".to_string(),
            access_key: "minioadmin".to_string(),
            secret_key: "minioadmin".to_string(),
            bucket: "file_storage".to_string(),
            region: "us-east-1".to_string(),
            create_bucket: false,
            cache_control_secs: 3600,
        }
    }

    #[test]
    fn test_encode_key_keeps_separators() {
        assert_eq!(encode_key("user1/abc.pdf"), "user1/abc.pdf");
        assert_eq!(encode_key("user 1/a b.txt"), "user%201/a%20b.txt");
    }

    #[test]
    fn test_public_url_uses_public_endpoint() {
        let client = MinIOClient::new(test_config()).unwrap();
        assert_eq!(client.bucket_name(), "file_storage");
        assert_eq!(
            client.public_url("user1/abc.pdf"),
            "https://files.example.com/file_storage/user1/abc.pdf"
        );
    }
}
