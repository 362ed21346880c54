//! Showoff upload service
//!
//! Mediates image uploads between clients and an S3-compatible object store:
//! clients get a presigned URL, upload directly, then ask the service to
//! commit. Commit sanitizes the image into metadata-free WebP plus a
//! thumbnail and publishes both.

#![deny(clippy::all, clippy::pedantic, clippy::nursery, missing_docs, dead_code)]

/// Shared-secret access guard
pub mod middleware;

/// Object store gateway and backends
pub mod object_store;

/// HTTP routes
pub mod routes;

/// Image decoding, normalization and WebP encoding
pub mod sanitizer;

/// Router assembly and serving
pub mod server;

/// Configuration, environment, API errors and extractors
pub mod types;

/// Presign authorization and commit pipeline
pub mod uploads;
