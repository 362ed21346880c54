//! Commit step: raw upload in, sanitized published pair out

use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, error, info, warn};

use super::{
    keys::{self, PublishedKeys},
    policy::{IMMUTABLE_CACHE_CONTROL, MAX_UPLOAD_BYTES},
    InvalidInput, UploadError, UploadResult,
};
use crate::{
    object_store::{ObjectStore, PutOptions, StoreError},
    sanitizer::{sanitize, EncodeProfile, SanitizeError, SanitizedImage, OUTPUT_CONTENT_TYPE},
};

/// Status reported for every successful commit
pub const COMMIT_STATUS_OK: &str = "OK";

/// Outcome of a successful commit, returned once and not persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitResult {
    /// Always [`COMMIT_STATUS_OK`]
    pub status: &'static str,
    /// Public URL of the full-size image
    pub url_original: String,
    /// Public URL of the thumbnail
    pub url_thumb: String,
    /// Width of the full-size image after orientation correction
    pub width: u32,
    /// Height of the full-size image after orientation correction
    pub height: u32,
    /// Size of the encoded full-size image, not of the raw upload
    pub byte_size: usize,
    /// When the commit completed
    pub created_at: DateTime<Utc>,
}

/// Validates, sanitizes and publishes raw uploads
pub struct CommitPipeline {
    store: Arc<dyn ObjectStore>,
    public_base_url: String,
}

impl CommitPipeline {
    /// Creates a pipeline publishing URLs under `public_base_url` (no trailing slash)
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, public_base_url: impl Into<String>) -> Self {
        Self {
            store,
            public_base_url: public_base_url.into(),
        }
    }

    /// Commits the raw upload at `raw_key` as a new image of `post_id`
    ///
    /// Every call publishes under a fresh image id, so committing the same
    /// inputs twice yields two distinct pairs. Failure to delete the raw
    /// object after publishing is logged and otherwise ignored.
    ///
    /// # Errors
    ///
    /// - `UploadError::NotFound` - the raw object could not be retrieved
    /// - `UploadError::InvalidInput` - empty, oversized or undecodable payload
    /// - `UploadError::Storage` - either publish write failed
    pub async fn commit(&self, post_id: &str, raw_key: &str) -> UploadResult<CommitResult> {
        // Only keys this service issued are ever read or deleted
        if !keys::is_raw_key(raw_key) {
            debug!(raw_key, "Refusing commit of a key outside the raw prefix");
            return Err(UploadError::NotFound);
        }

        let raw = match self.store.get(raw_key, MAX_UPLOAD_BYTES).await {
            Ok(raw) => raw,
            Err(StoreError::TooLarge { .. }) => return Err(InvalidInput::TooLarge.into()),
            Err(e) => {
                debug!(raw_key, error = %e, "Raw upload could not be retrieved");
                return Err(UploadError::NotFound);
            }
        };

        if raw.is_empty() {
            return Err(InvalidInput::EmptyFile.into());
        }
        if u64::try_from(raw.len()).map_or(true, |len| len > MAX_UPLOAD_BYTES) {
            return Err(InvalidInput::TooLarge.into());
        }

        let (original, thumbnail) = sanitize_pair(raw).await?;

        let image_id = keys::new_token();
        let published = PublishedKeys::new(post_id, &image_id);
        let options =
            PutOptions::new(OUTPUT_CONTENT_TYPE).with_cache_control(IMMUTABLE_CACHE_CONTROL);

        let SanitizedImage {
            data: original_data,
            width,
            height,
        } = original;
        let byte_size = original_data.len();

        // No rollback: a failure here may leave one half of the pair behind
        tokio::try_join!(
            self.store.put(&published.original, original_data, &options),
            self.store.put(&published.thumbnail, thumbnail.data, &options),
        )
        .map_err(|e| {
            error!(post_id, image_id = %image_id, error = %e, "Failed to publish sanitized image");
            UploadError::Storage(e)
        })?;

        if let Err(e) = self.store.delete(raw_key).await {
            warn!(raw_key, error = %e, "Failed to delete raw upload after publishing");
        }

        info!(post_id, image_id = %image_id, width, height, byte_size, "Image committed");

        Ok(CommitResult {
            status: COMMIT_STATUS_OK,
            url_original: self.public_url(&published.original),
            url_thumb: self.public_url(&published.thumbnail),
            width,
            height,
            byte_size,
            created_at: Utc::now(),
        })
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url)
    }
}

/// Sanitizes `raw` into the full-size image and the thumbnail
///
/// The thumbnail decodes the raw bytes a second time instead of reusing the
/// full-size pass. Both run on the blocking pool.
async fn sanitize_pair(raw: Bytes) -> UploadResult<(SanitizedImage, SanitizedImage)> {
    let outcome = tokio::task::spawn_blocking(move || {
        let original = sanitize(&raw, EncodeProfile::ORIGINAL)?;
        let thumbnail = sanitize(&raw, EncodeProfile::THUMBNAIL)?;
        Ok::<_, SanitizeError>((original, thumbnail))
    })
    .await;

    match outcome {
        Ok(Ok(pair)) => Ok(pair),
        Ok(Err(e)) => {
            debug!(error = %e, "Raw upload rejected by sanitizer");
            Err(InvalidInput::InvalidImage.into())
        }
        Err(e) => {
            error!(error = %e, "Sanitizer task failed");
            Err(InvalidInput::InvalidImage.into())
        }
    }
}
