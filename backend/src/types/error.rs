//! Universal error handling for the API

use aide::OperationOutput;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use schemars::JsonSchema;
use serde::Serialize;

use crate::uploads::UploadError;

/// API error response envelope shared by every endpoint
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiErrorResponse {
    /// Whether the client should retry the request
    pub allow_retry: bool,
    /// Error details
    error: ErrorBody,
}

/// Error body containing code and message
#[derive(Debug, Serialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    /// Machine-readable error code
    pub code: &'static str,
    /// Human-readable error message
    pub message: String,
}

/// Application error type that wraps the API error response
#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    inner: ApiErrorResponse,
}

impl AppError {
    /// Create a new application error
    #[must_use]
    pub fn new(
        status: StatusCode,
        code: &'static str,
        msg: impl Into<String>,
        retry: bool,
    ) -> Self {
        Self {
            status,
            inner: ApiErrorResponse {
                allow_retry: retry,
                error: ErrorBody {
                    code,
                    message: msg.into(),
                },
            },
        }
    }

    /// A 400 `validation_error` for `field`, described by `reason`
    #[must_use]
    pub fn validation_from_str(field: &str, reason: &str) -> Self {
        let message = if field.is_empty() {
            reason.to_string()
        } else {
            format!("{field}: {reason}")
        };
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message, false)
    }

    /// HTTP status of this error
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.inner.error.code
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self.status.as_u16() {
            400..=499 => tracing::warn!(
                "Client error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            500..=599 => tracing::error!(
                "Server error: {} - {}",
                self.inner.error.code,
                self.inner.error.message
            ),
            _ => {}
        }

        (self.status, Json(self.inner)).into_response()
    }
}

/// Convert pipeline errors to application errors
impl From<UploadError> for AppError {
    fn from(err: UploadError) -> Self {
        match &err {
            UploadError::Unauthorized => Self::new(
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                err.to_string(),
                false,
            ),
            UploadError::UnsupportedMediaType(_) => Self::new(
                StatusCode::BAD_REQUEST,
                "unsupported_media_type",
                err.to_string(),
                false,
            ),
            UploadError::PayloadTooLarge { declared, .. } => {
                tracing::debug!(declared, "Declared upload size rejected");
                Self::new(
                    StatusCode::BAD_REQUEST,
                    "payload_too_large",
                    err.to_string(),
                    false,
                )
            }
            UploadError::NotFound => {
                Self::new(StatusCode::NOT_FOUND, "not_found", err.to_string(), false)
            }
            UploadError::InvalidInput(reason) => Self::new(
                StatusCode::BAD_REQUEST,
                "invalid_input",
                reason.to_string(),
                false,
            ),
            UploadError::Storage(source) => {
                tracing::error!("Object store error: {source}");
                Self::new(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "storage_error",
                    "Storage error",
                    true,
                )
            }
        }
    }
}

impl OperationOutput for AppError {
    type Inner = ApiErrorResponse;

    fn operation_response(
        ctx: &mut aide::generate::GenContext,
        operation: &mut aide::openapi::Operation,
    ) -> Option<aide::openapi::Response> {
        Json::<ApiErrorResponse>::operation_response(ctx, operation)
    }
}
