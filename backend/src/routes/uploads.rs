//! Upload endpoints

use std::sync::{Arc, LazyLock};

use axum::{Extension, Json};
use regex::Regex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::{
    types::{AppError, ValidatedJson},
    uploads::{CommitPipeline, UploadAuthorizer},
};

static POST_ID_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{1,128}$").expect("Invalid regex"));

/// Request to authorize a direct upload
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct PresignRequest {
    /// Client-side file name, informational only
    pub filename: String,
    /// MIME type of the file: `image/jpeg`, `image/png` or `image/webp`
    pub content_type: String,
    /// Declared size in bytes, at most 5 MiB
    #[validate(range(min = 1))]
    pub bytes: u64,
}

/// Direct-upload authorization
#[derive(Debug, Serialize, JsonSchema)]
pub struct PresignResponse {
    /// Presigned `PUT` URL, valid for 300 seconds
    pub upload_url: String,
    /// Key to pass back to `/api/uploads/commit`
    pub raw_key: String,
    /// Normalized content type; the upload must be sent with it
    pub content_type: String,
}

/// Request to publish a raw upload
#[derive(Debug, Deserialize, JsonSchema, Validate)]
pub struct CommitRequest {
    /// Post the image belongs to
    #[validate(custom(function = "validate_post_id"))]
    pub post_id: String,
    /// Key returned by `/api/uploads/presign`
    #[validate(length(min = 1))]
    pub raw_key: String,
}

/// Published image pair
#[derive(Debug, Serialize, JsonSchema)]
pub struct CommitResponse {
    /// Always `OK`
    pub status: String,
    /// Public URL of the sanitized image
    pub url_original: String,
    /// Public URL of the thumbnail
    pub url_thumb: String,
    /// Width in pixels after orientation correction
    pub width: u32,
    /// Height in pixels after orientation correction
    pub height: u32,
    /// Size of the sanitized image in bytes
    pub bytes: usize,
    /// RFC 3339 UTC timestamp
    pub created_at: String,
}

fn validate_post_id(post_id: &str) -> Result<(), validator::ValidationError> {
    if POST_ID_REGEX.is_match(post_id) {
        return Ok(());
    }

    let mut error = validator::ValidationError::new("invalid_post_id");
    error.message = Some(std::borrow::Cow::Borrowed(
        "must be 1 to 128 characters of letters, digits, '_' or '-'",
    ));
    Err(error)
}

/// Authorize a direct upload
///
/// Checks the declared type and size and returns a short-lived URL the
/// client uploads the file to. No file bytes pass through this service.
///
/// # Errors
///
/// - 400 `unsupported_media_type` - type outside the allow-list
/// - 400 `payload_too_large` - declared size above 5 MiB
/// - 500 `storage_error` - the URL could not be signed
#[instrument(skip(authorizer, request))]
pub async fn presign(
    Extension(authorizer): Extension<Arc<UploadAuthorizer>>,
    ValidatedJson(request): ValidatedJson<PresignRequest>,
) -> Result<Json<PresignResponse>, AppError> {
    let authorization = authorizer
        .authorize(&request.filename, &request.content_type, request.bytes)
        .await?;

    Ok(Json(PresignResponse {
        upload_url: authorization.upload_url,
        raw_key: authorization.raw_key,
        content_type: authorization.content_type.mime().to_string(),
    }))
}

/// Publish an uploaded image
///
/// Re-encodes the raw upload to WebP without metadata, publishes it with a
/// 640px thumbnail and deletes the raw upload.
///
/// # Errors
///
/// - 404 `not_found` - raw upload missing, expired or unreadable
/// - 400 `invalid_input` - empty, too large or not an image
/// - 500 `storage_error` - publishing failed
#[instrument(skip(pipeline, request), fields(post_id = %request.post_id))]
pub async fn commit(
    Extension(pipeline): Extension<Arc<CommitPipeline>>,
    ValidatedJson(request): ValidatedJson<CommitRequest>,
) -> Result<Json<CommitResponse>, AppError> {
    let result = pipeline.commit(&request.post_id, &request.raw_key).await?;

    Ok(Json(CommitResponse {
        status: result.status.to_string(),
        url_original: result.url_original,
        url_thumb: result.url_thumb,
        width: result.width,
        height: result.height,
        bytes: result.byte_size,
        created_at: result.created_at.to_rfc3339(),
    }))
}
