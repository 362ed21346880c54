//! Object store gateway
//!
//! The upload pipeline only talks to storage through the [`ObjectStore`] trait.
//! Production uses [`S3ObjectStore`] against any S3-compatible endpoint
//! (Cloudflare R2, `LocalStack`, AWS). Tests use the in-memory backend.

mod error;
#[cfg(any(test, feature = "test-utils"))]
mod memory;
mod s3;

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

pub use error::{StoreError, StoreResult};
#[cfg(any(test, feature = "test-utils"))]
pub use memory::MemoryObjectStore;
pub use s3::S3ObjectStore;

/// Headers attached to an object when it is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PutOptions {
    /// `Content-Type` of the stored object
    pub content_type: String,
    /// Optional `Cache-Control` directive served with the object
    pub cache_control: Option<String>,
}

impl PutOptions {
    /// Options for an object with the given content type and no cache directive
    #[must_use]
    pub fn new(content_type: impl Into<String>) -> Self {
        Self {
            content_type: content_type.into(),
            cache_control: None,
        }
    }

    /// Sets the `Cache-Control` directive
    #[must_use]
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = Some(cache_control.into());
        self
    }
}

/// Storage operations needed by the upload pipeline
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Reads the object stored under `key`, refusing it once it proves
    /// larger than `max_bytes`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` when no object exists under `key`,
    /// `StoreError::TooLarge` when it exceeds `max_bytes`, any other variant
    /// for transport or service failures.
    async fn get(&self, key: &str, max_bytes: u64) -> StoreResult<Bytes>;

    /// Writes `body` under `key`, replacing any existing object
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` when the write is rejected or does not complete.
    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> StoreResult<()>;

    /// Deletes the object stored under `key`
    ///
    /// # Errors
    ///
    /// Returns a `StoreError` when the store rejects the delete.
    async fn delete(&self, key: &str) -> StoreResult<()>;

    /// Produces a URL the client can `PUT` to directly, bound to `key` and
    /// `content_type` and valid for `expires_in`
    ///
    /// # Errors
    ///
    /// Returns `StoreError::ConfigError` for an invalid expiry, another
    /// variant if signing fails.
    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StoreResult<String>;
}
