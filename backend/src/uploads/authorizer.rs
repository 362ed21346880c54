//! Presign step: turns a declared upload into a short-lived direct-upload URL

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info};

use super::{
    keys,
    policy::{ImageContentType, MAX_UPLOAD_BYTES},
    UploadError, UploadResult,
};
use crate::object_store::ObjectStore;

/// Scoped permission for one direct upload to the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadAuthorization {
    /// Presigned `PUT` URL, expires after the authorizer's TTL
    pub upload_url: String,
    /// Key the client uploads to, to be passed back on commit
    pub raw_key: String,
    /// Normalized content type the URL is bound to
    pub content_type: ImageContentType,
}

/// Issues upload authorizations after checking declared type and size
pub struct UploadAuthorizer {
    store: Arc<dyn ObjectStore>,
    presign_ttl: Duration,
}

impl UploadAuthorizer {
    /// Creates an authorizer issuing URLs valid for `presign_ttl`
    #[must_use]
    pub fn new(store: Arc<dyn ObjectStore>, presign_ttl: Duration) -> Self {
        Self { store, presign_ttl }
    }

    /// Validates the declaration and requests a presigned URL for a fresh raw key
    ///
    /// `declared_bytes` is trusted at this stage; the actual stored size is
    /// enforced again at commit. No bytes pass through this service here.
    ///
    /// # Errors
    ///
    /// - `UploadError::UnsupportedMediaType` - content type outside the allow-list
    /// - `UploadError::PayloadTooLarge` - declared size above [`MAX_UPLOAD_BYTES`]
    /// - `UploadError::Storage` - the store could not sign the URL
    pub async fn authorize(
        &self,
        filename: &str,
        declared_content_type: &str,
        declared_bytes: u64,
    ) -> UploadResult<UploadAuthorization> {
        let content_type = ImageContentType::parse(declared_content_type).ok_or_else(|| {
            UploadError::UnsupportedMediaType(declared_content_type.trim().to_ascii_lowercase())
        })?;

        if declared_bytes > MAX_UPLOAD_BYTES {
            return Err(UploadError::PayloadTooLarge {
                declared: declared_bytes,
                max: MAX_UPLOAD_BYTES,
            });
        }

        let raw_key = keys::new_raw_key(content_type);
        debug!(%raw_key, filename, "Issuing upload authorization");

        let upload_url = self
            .store
            .presign_put(&raw_key, content_type.mime(), self.presign_ttl)
            .await?;

        info!(
            %raw_key,
            content_type = content_type.mime(),
            declared_bytes,
            "Upload authorized"
        );

        Ok(UploadAuthorization {
            upload_url,
            raw_key,
            content_type,
        })
    }
}
