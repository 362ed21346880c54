//! Shared-secret access guard for the upload endpoints

use std::{fmt, sync::Arc};

use axum::{extract::Request, middleware::Next, response::Response, Extension};
use subtle::ConstantTimeEq;

use crate::{types::AppError, uploads::UploadError};

/// Header carrying the shared secret
pub const API_KEY_HEADER: &str = "x-api-key";

/// Single shared-secret check in front of the upload endpoints
///
/// This is a minimal gate: no rate limiting, no per-caller identity.
#[derive(Clone)]
pub struct AccessGuard {
    expected: Arc<str>,
}

impl fmt::Debug for AccessGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessGuard")
            .field("expected", &"<redacted>")
            .finish()
    }
}

impl AccessGuard {
    /// Creates a guard accepting exactly `expected`
    #[must_use]
    pub fn new(expected: impl Into<Arc<str>>) -> Self {
        Self {
            expected: expected.into(),
        }
    }

    /// Checks a presented credential, `None` when the caller sent none
    ///
    /// # Errors
    ///
    /// Returns `UploadError::Unauthorized` when the credential is absent or differs
    pub fn verify(&self, presented: Option<&str>) -> Result<(), UploadError> {
        let presented = presented.ok_or(UploadError::Unauthorized)?;

        if bool::from(presented.as_bytes().ct_eq(self.expected.as_bytes())) {
            Ok(())
        } else {
            Err(UploadError::Unauthorized)
        }
    }
}

/// Rejects requests without the expected `x-api-key` header with a 401
///
/// # Errors
///
/// - `AppError` - missing, non-UTF-8 or wrong credential
pub async fn api_key_middleware(
    Extension(guard): Extension<Arc<AccessGuard>>,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let presented = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if let Err(e) = guard.verify(presented) {
        tracing::debug!(
            has_credential = presented.is_some(),
            "Rejected request with bad API key"
        );
        return Err(e.into());
    }

    Ok(next.run(request).await)
}
