//! In-memory object store used by tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use super::{ObjectStore, PutOptions, StoreError, StoreResult};

/// Object held by [`MemoryObjectStore`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Object payload
    pub body: Bytes,
    /// Headers the object was written with
    pub options: PutOptions,
}

/// Object store keeping everything in a map, with switches to inject failures
#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<String, StoredObject>>,
    failing_put_suffix: Mutex<Option<String>>,
    fail_deletes: AtomicBool,
    bytes_served: AtomicU64,
}

impl MemoryObjectStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn objects(&self) -> MutexGuard<'_, HashMap<String, StoredObject>> {
        self.objects.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Stores `body` under `key` the way a client upload through a presigned URL would
    pub fn insert(&self, key: &str, body: impl Into<Bytes>, content_type: &str) {
        self.objects().insert(
            key.to_string(),
            StoredObject {
                body: body.into(),
                options: PutOptions::new(content_type),
            },
        );
    }

    /// Returns the object under `key`, if any
    #[must_use]
    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects().get(key).cloned()
    }

    /// Whether an object exists under `key`
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.objects().contains_key(key)
    }

    /// All stored keys, sorted
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.objects().keys().cloned().collect();
        keys.sort();
        keys
    }

    /// Makes every `put` whose key ends with `suffix` fail
    pub fn fail_puts_ending_with(&self, suffix: &str) {
        *self
            .failing_put_suffix
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(suffix.to_string());
    }

    /// Total payload bytes handed out by `get` so far
    #[must_use]
    pub fn bytes_served(&self) -> u64 {
        self.bytes_served.load(Ordering::SeqCst)
    }

    /// Makes every `delete` fail while `fail` is set
    pub fn set_fail_deletes(&self, fail: bool) {
        self.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn get(&self, key: &str, max_bytes: u64) -> StoreResult<Bytes> {
        let body = self
            .objects()
            .get(key)
            .map(|object| object.body.clone())
            .ok_or_else(|| StoreError::NotFound(key.to_string()))?;

        let len = u64::try_from(body.len()).unwrap_or(u64::MAX);
        if len > max_bytes {
            return Err(StoreError::TooLarge {
                key: key.to_string(),
                max: max_bytes,
            });
        }

        self.bytes_served.fetch_add(len, Ordering::SeqCst);
        Ok(body)
    }

    async fn put(&self, key: &str, body: Vec<u8>, options: &PutOptions) -> StoreResult<()> {
        let failing = self
            .failing_put_suffix
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        if failing.is_some_and(|suffix| key.ends_with(&suffix)) {
            return Err(StoreError::UpstreamError(format!("injected put failure: {key}")));
        }

        self.objects().insert(
            key.to_string(),
            StoredObject {
                body: Bytes::from(body),
                options: options.clone(),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> StoreResult<()> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::UpstreamError(format!(
                "injected delete failure: {key}"
            )));
        }
        // S3 semantics: deleting a missing key succeeds
        self.objects().remove(key);
        Ok(())
    }

    async fn presign_put(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> StoreResult<String> {
        if expires_in.is_zero() {
            return Err(StoreError::ConfigError(
                "presigned URL expiry must be positive".to_string(),
            ));
        }
        Ok(format!(
            "memory://uploads/{key}?content-type={content_type}&expires-in={}",
            expires_in.as_secs()
        ))
    }
}
