pub mod thumbnail;

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use tracing::{debug, info};

use crate::config::StorageConfig;
use crate::errors::{MediaError, Result};

/// Object storage the image endpoints and the thumbnail pipeline rely on.
#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Presigned URL the client PUTs the image bytes to.
    async fn upload_url(&self, key: &str) -> Result<String>;

    async fn fetch_image(&self, bucket: &str, key: &str) -> Result<Vec<u8>>;

    async fn store_thumbnail(&self, key: &str, bytes: Vec<u8>) -> Result<()>;
}

pub struct S3ImageStorage {
    client: Client,
    config: StorageConfig,
}

impl S3ImageStorage {
    pub fn new(client: Client, config: StorageConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl ImageStorage for S3ImageStorage {
    async fn upload_url(&self, key: &str) -> Result<String> {
        let bucket = &self.config.images_bucket;
        let presign_error = |reason: String| MediaError::Presign {
            bucket: bucket.clone(),
            key: key.to_string(),
            reason,
        };

        let presigning = PresigningConfig::expires_in(Duration::from_secs(
            self.config.signed_url_expiration_secs,
        ))
        .map_err(|e| presign_error(e.to_string()))?;

        let request = self
            .client
            .put_object()
            .bucket(bucket)
            .key(key)
            .presigned(presigning)
            .await
            .map_err(|e| presign_error(e.to_string()))?;

        debug!("Presigned upload for s3://{}/{}", bucket, key);
        Ok(request.uri().to_string())
    }

    async fn fetch_image(&self, bucket: &str, key: &str) -> Result<Vec<u8>> {
        let download_error = |reason: String| MediaError::Download {
            bucket: bucket.to_string(),
            key: key.to_string(),
            reason,
        };

        let output = self
            .client
            .get_object()
            .bucket(bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| download_error(e.to_string()))?;

        Ok(data.into_bytes().to_vec())
    }

    async fn store_thumbnail(&self, key: &str, bytes: Vec<u8>) -> Result<()> {
        let bucket = &self.config.thumbnails_bucket;
        let size = bytes.len();

        self.client
            .put_object()
            .bucket(bucket)
            .key(key)
            .content_type("image/jpeg")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| MediaError::Upload {
                bucket: bucket.clone(),
                key: key.to_string(),
                reason: e.to_string(),
            })?;

        info!("Wrote thumbnail s3://{}/{} ({} bytes)", bucket, key, size);
        Ok(())
    }
}

/// Undoes the form encoding S3 applies to object keys in event notifications.
/// `None` when the escapes do not decode to UTF-8.
pub fn decode_object_key(key: &str) -> Option<String> {
    urlencoding::decode(&key.replace('+', " "))
        .ok()
        .map(|decoded| decoded.into_owned())
}
