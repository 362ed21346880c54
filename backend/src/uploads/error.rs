//! Error taxonomy of the upload pipeline

use std::fmt;

use thiserror::Error;

use crate::object_store::StoreError;

/// Result type for upload operations
pub type UploadResult<T> = Result<T, UploadError>;

/// Why a retrieved raw object was refused at commit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvalidInput {
    /// The stored object has no bytes
    EmptyFile,
    /// The stored object exceeds the size ceiling
    TooLarge,
    /// The stored object does not decode as an image
    InvalidImage,
}

impl fmt::Display for InvalidInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::EmptyFile => "Empty file",
            Self::TooLarge => "File too large",
            Self::InvalidImage => "Invalid image",
        })
    }
}

/// Errors surfaced by the access guard, authorizer and commit pipeline
#[derive(Error, Debug)]
pub enum UploadError {
    /// Missing or wrong credential
    #[error("Unauthorized")]
    Unauthorized,

    /// Declared content type outside the allow-list
    #[error("Unsupported content_type: {0}")]
    UnsupportedMediaType(String),

    /// Declared size above the ceiling
    #[error("File too large (max {max} bytes)")]
    PayloadTooLarge {
        /// Size the client declared
        declared: u64,
        /// Configured ceiling
        max: u64,
    },

    /// Raw object could not be retrieved, whatever the underlying cause
    #[error("Raw upload not found")]
    NotFound,

    /// Retrieved object failed validation
    #[error("{0}")]
    InvalidInput(InvalidInput),

    /// Store rejected a write or a presign request
    #[error("Storage error: {0}")]
    Storage(#[source] StoreError),
}

impl From<InvalidInput> for UploadError {
    fn from(reason: InvalidInput) -> Self {
        Self::InvalidInput(reason)
    }
}

impl From<StoreError> for UploadError {
    fn from(error: StoreError) -> Self {
        Self::Storage(error)
    }
}
