//! S3-compatible object store backend

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::{presigning::PresigningConfig, primitives::ByteStream, Client as S3Client};
use bytes::{Bytes, BytesMut};
use tracing::debug;

use super::{ObjectStore, PutOptions, StoreError, StoreResult};

/// Object store client for a single S3 bucket
pub struct S3ObjectStore {
    s3_client: Arc<S3Client>,
    bucket_name: String,
}

impl S3ObjectStore {
    /// Creates a new object store client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - Bucket holding both raw uploads and published images
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String) -> Self {
        Self {
            s3_client,
            bucket_name,
        }
    }
}

fn exceeds(len: usize, max_bytes: u64) -> bool {
    u64::try_from(len).map_or(true, |len| len > max_bytes)
}

/// Refuses an object whose advertised `Content-Length` is above `max_bytes`
fn check_content_length(content_length: Option<i64>, key: &str, max_bytes: u64) -> StoreResult<()> {
    match content_length.map(u64::try_from) {
        Some(Ok(len)) if len > max_bytes => Err(StoreError::TooLarge {
            key: key.to_string(),
            max: max_bytes,
        }),
        _ => Ok(()),
    }
}

/// Drains `body` chunk by chunk, stopping as soon as more than `max_bytes` arrived
async fn read_bounded(mut body: ByteStream, key: &str, max_bytes: u64) -> StoreResult<Bytes> {
    let mut data = BytesMut::new();

    while let Some(chunk) = body.next().await {
        let chunk = chunk
            .map_err(|e| StoreError::AwsError(format!("Failed to read object body: {e}")))?;
        if exceeds(data.len() + chunk.len(), max_bytes) {
            return Err(StoreError::TooLarge {
                key: key.to_string(),
                max: max_bytes,
            });
        }
        data.extend_from_slice(&chunk);
    }

    Ok(data.freeze())
}

#[async_trait]
impl ObjectStore for S3ObjectStore {
    async fn get(&self, key: &str, max_bytes: u64) -> StoreResult<Bytes> {
        debug!("Fetching object: {} (at most {} bytes)", key, max_bytes);

        let output = self
            .s3_client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await?;

        // The presigned PUT does not bind a length, so the object may be anything
        check_content_length(output.content_length(), key, max_bytes)?;
        read_bounded(output.body, key, max_bytes).await
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> StoreResult<()> {
        debug!("Writing object: {} ({} bytes)", key, body.len());

        let mut request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(&options.content_type)
            .body(ByteStream::from(body));

        if let Some(cache_control) = &options.cache_control {
            request = request.cache_control(cache_control);
        }

        request.send().await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        debug!("Deleting object: {}", key);

        self.s3_client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await?;

        Ok(())
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StoreResult<String> {
        debug!(
            "Generating presigned URL for object: {} with content type: {}",
            key, content_type
        );

        let presigned_config = PresigningConfig::expires_in(expires_in).map_err(|e| {
            StoreError::ConfigError(format!("Failed to create presigning config: {e}"))
        })?;

        let presigned_request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .content_type(content_type)
            .presigned(presigned_config)
            .await
            .map_err(|e| StoreError::S3Error(format!("Failed to generate presigned URL: {e}")))?;

        Ok(presigned_request.uri().to_string())
    }
}
