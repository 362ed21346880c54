use std::{collections::HashMap, sync::Arc};

use axum::{body::Body, http::Request, response::Response, Router};
use showoff_backend::{
    middleware::API_KEY_HEADER,
    object_store::MemoryObjectStore,
    server,
    types::{AppConfig, Environment},
};
use tower::ServiceExt;

pub const TEST_API_KEY: &str = "test-api-key";
pub const TEST_PUBLIC_BASE: &str = "https://cdn.example.com";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Configuration pointing at LocalStack; in-memory tests never dial it
pub fn test_config(environment: &str) -> AppConfig {
    let vars = HashMap::from([
        ("APP_ENV", environment),
        ("R2_ENDPOINT", "http://localhost:4566"),
        ("R2_REGION", "us-east-1"),
        ("R2_ACCESS_KEY_ID", "test"),
        ("R2_SECRET_ACCESS_KEY", "test"),
        ("R2_BUCKET", "showoff-uploads"),
        ("R2_PUBLIC_BASE", "https://cdn.example.com/"),
        ("API_KEY", TEST_API_KEY),
    ]);

    AppConfig::from_lookup(|name| vars.get(name).map(ToString::to_string))
        .expect("test configuration is valid")
}

/// Full router backed by an in-memory object store
pub struct TestSetup {
    pub router: Router,
    pub store: Arc<MemoryObjectStore>,
    pub environment: Environment,
}

impl TestSetup {
    pub fn new() -> Self {
        Self::with_environment("development")
    }

    pub fn with_environment(environment: &str) -> Self {
        setup_test_env();

        let config = test_config(environment);
        let store = Arc::new(MemoryObjectStore::new());
        let router = server::router(&config, store.clone());

        Self {
            router,
            store,
            environment: config.environment,
        }
    }

    /// POST `payload` as JSON with the test API key
    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_post_request_with_key(route, payload, Some(TEST_API_KEY))
            .await
    }

    /// POST `payload` as JSON, sending `api_key` when given
    pub async fn send_post_request_with_key(
        &self,
        route: &str,
        payload: serde_json::Value,
        api_key: Option<&str>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let mut builder = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json");
        if let Some(api_key) = api_key {
            builder = builder.header(API_KEY_HEADER, api_key);
        }
        let request = builder.body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// POST a raw body with the test API key
    pub async fn send_raw_post_request(
        &self,
        route: &str,
        body: &'static str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, TEST_API_KEY)
            .body(Body::from(body))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    /// Presign an upload and return the parsed response body
    pub async fn presign(&self, content_type: &str, bytes: u64) -> serde_json::Value {
        let response = self
            .send_post_request(
                "/api/uploads/presign",
                serde_json::json!({
                    "filename": "upload",
                    "content_type": content_type,
                    "bytes": bytes,
                }),
            )
            .await
            .expect("Failed to send request");
        assert_eq!(response.status(), http::StatusCode::OK);
        super::parse_response_body(response).await
    }

    /// Simulates the client's direct upload to the presigned URL
    pub fn upload_raw(&self, raw_key: &str, data: Vec<u8>, content_type: &str) {
        self.store.insert(raw_key, data, content_type);
    }

    /// Strip the public base from a published URL, yielding its store key
    pub fn key_of(url: &str) -> String {
        url.strip_prefix(TEST_PUBLIC_BASE)
            .and_then(|rest| rest.strip_prefix('/'))
            .expect("URL under the public base")
            .to_string()
    }
}
