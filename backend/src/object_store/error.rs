//! Error types for object store operations

use aws_sdk_s3::{
    error::SdkError,
    operation::{
        delete_object::DeleteObjectError, get_object::GetObjectError, put_object::PutObjectError,
    },
};
use thiserror::Error;

/// Result type for object store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during object store operations
#[derive(Error, Debug)]
pub enum StoreError {
    /// No object stored under the key
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Object larger than the caller allowed; the read was abandoned
    #[error("Object {key} exceeds {max} bytes")]
    TooLarge {
        /// Key of the refused object
        key: String,
        /// Limit the object exceeded
        max: u64,
    },

    /// S3 service error
    #[error("S3 service error: {0}")]
    S3Error(String),

    /// Upstream service error (5xx from the store)
    #[error("Upstream service error: {0}")]
    UpstreamError(String),

    /// Transport, timeout or SDK level failure
    #[error("AWS SDK error: {0}")]
    AwsError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl StoreError {
    fn from_sdk<E, R>(error: SdkError<E, R>) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
        R: std::fmt::Debug,
    {
        match error {
            SdkError::ServiceError(service_err) => Self::S3Error(format!("{:?}", service_err.err())),
            SdkError::TimeoutError(_) => Self::AwsError("operation timed out".to_string()),
            other => Self::AwsError(format!("{other:?}")),
        }
    }
}

impl From<SdkError<GetObjectError>> for StoreError {
    fn from(error: SdkError<GetObjectError>) -> Self {
        if let SdkError::ServiceError(ref service_err) = error {
            if matches!(service_err.err(), GetObjectError::NoSuchKey(_))
                || service_err.raw().status().as_u16() == 404
            {
                return Self::NotFound(format!("{:?}", service_err.err()));
            }
            if service_err.raw().status().as_u16() >= 500 {
                return Self::UpstreamError(format!("{:?}", service_err.err()));
            }
        }
        Self::from_sdk(error)
    }
}

impl From<SdkError<PutObjectError>> for StoreError {
    fn from(error: SdkError<PutObjectError>) -> Self {
        if let SdkError::ServiceError(ref service_err) = error {
            if service_err.raw().status().as_u16() >= 500 {
                return Self::UpstreamError(format!("{:?}", service_err.err()));
            }
        }
        Self::from_sdk(error)
    }
}

impl From<SdkError<DeleteObjectError>> for StoreError {
    fn from(error: SdkError<DeleteObjectError>) -> Self {
        Self::from_sdk(error)
    }
}
