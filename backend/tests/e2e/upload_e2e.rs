//! Full flow against a real S3 API (LocalStack on localhost:4566)
//!
//! Run with `cargo test --test upload_e2e -- --ignored` after `docker run -p 4566:4566 localstack/localstack`.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use common::*;
use http::StatusCode;
use serde_json::json;
use showoff_backend::{
    object_store::{ObjectStore, S3ObjectStore, StoreError},
    server,
    types::AppConfig,
    uploads::policy::MAX_UPLOAD_BYTES,
};
use tower::ServiceExt;

/// E2E test setup with real dependencies
pub struct E2ETestSetup {
    pub router: axum::Router,
    pub store: Arc<S3ObjectStore>,
    pub config: AppConfig,
}

impl E2ETestSetup {
    pub async fn new() -> Self {
        setup_test_env();

        let config = test_config("development");
        let s3_client = Arc::new(S3Client::from_conf(config.store.s3_client_config()));

        // Bucket may already exist from a previous run
        let _ = s3_client
            .create_bucket()
            .bucket(&config.store.bucket)
            .send()
            .await;

        let store = Arc::new(S3ObjectStore::new(s3_client, config.store.bucket.clone()));
        let router = server::router(&config, store.clone());

        Self {
            router,
            store,
            config,
        }
    }

    pub async fn post(&self, route: &str, payload: serde_json::Value) -> axum::response::Response {
        let request = axum::http::Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .header("x-api-key", TEST_API_KEY)
            .body(axum::body::Body::from(payload.to_string()))
            .unwrap();

        self.router.clone().oneshot(request).await.unwrap()
    }
}

#[tokio::test]
#[ignore = "E2E tests - requires LocalStack"]
async fn test_presign_put_commit_against_localstack() {
    let setup = E2ETestSetup::new().await;
    let data = test_jpeg(1024, 768);

    // 1. Presign
    let response = setup
        .post(
            "/api/uploads/presign",
            json!({"filename": "a.jpg", "content_type": "image/jpeg", "bytes": data.len()}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let presign = parse_response_body(response).await;
    let upload_url = presign["upload_url"].as_str().unwrap();
    let raw_key = presign["raw_key"].as_str().unwrap().to_string();
    assert!(raw_key.starts_with("raw/"));

    // 2. Direct upload, bypassing the service
    let upload = reqwest::Client::new()
        .put(upload_url)
        .header("Content-Type", "image/jpeg")
        .body(data)
        .send()
        .await
        .expect("Failed to upload to presigned URL");
    assert!(upload.status().is_success(), "upload failed: {}", upload.status());

    // 3. Commit
    let response = setup
        .post(
            "/api/uploads/commit",
            json!({"post_id": "post42", "raw_key": raw_key}),
        )
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "OK");
    assert_eq!(body["width"], 1024);
    assert_eq!(body["height"], 768);

    // 4. Raw retired, published objects readable
    assert!(matches!(
        setup.store.get(&raw_key, MAX_UPLOAD_BYTES).await,
        Err(StoreError::NotFound(_))
    ));

    let base = format!("{}/", setup.config.public_base_url);
    for url in [&body["url_original"], &body["url_thumb"]] {
        let key = url.as_str().unwrap().strip_prefix(&base).unwrap();
        let published = setup.store.get(key, MAX_UPLOAD_BYTES).await.unwrap();
        assert!(is_webp(&published));
    }
}

#[tokio::test]
#[ignore = "E2E tests - requires LocalStack"]
async fn test_commit_missing_object_against_localstack() {
    let setup = E2ETestSetup::new().await;

    let response = setup
        .post(
            "/api/uploads/commit",
            json!({"post_id": "post42", "raw_key": "raw/0123456789abcdef0123456789abcdef.png"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
