mod common;

use common::*;

use http::StatusCode;
use serde_json::json;

const PROTECTED_ROUTES: [&str; 2] = ["/api/uploads/presign", "/api/uploads/commit"];

fn payload_for(route: &str) -> serde_json::Value {
    if route.ends_with("presign") {
        json!({"filename": "a.jpg", "content_type": "image/jpeg", "bytes": 1000})
    } else {
        json!({"post_id": "post42", "raw_key": "raw/0123456789abcdef0123456789abcdef.jpg"})
    }
}

#[tokio::test]
async fn test_missing_api_key_is_unauthorized() {
    let setup = TestSetup::new();

    for route in PROTECTED_ROUTES {
        let response = setup
            .send_post_request_with_key(route, payload_for(route), None)
            .await
            .expect("Failed to send request");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{route}");
        let body = parse_response_body(response).await;
        assert_error_code(&body, "unauthorized");
    }
}

#[tokio::test]
async fn test_wrong_api_key_is_unauthorized() {
    let setup = TestSetup::new();

    for api_key in ["", "wrong", "test-api-ke", "TEST-API-KEY", "dev-123"] {
        for route in PROTECTED_ROUTES {
            let response = setup
                .send_post_request_with_key(route, payload_for(route), Some(api_key))
                .await
                .expect("Failed to send request");

            assert_eq!(
                response.status(),
                StatusCode::UNAUTHORIZED,
                "{route} with {api_key:?}"
            );
        }
    }
}

#[tokio::test]
async fn test_auth_checked_before_request_validation() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request_with_key(
            "/api/uploads/presign",
            json!({"garbage": true}),
            Some("wrong"),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rejected_requests_touch_nothing() {
    let setup = TestSetup::new();
    let raw_key = "raw/0123456789abcdef0123456789abcdef.png";
    setup.upload_raw(raw_key, test_png(16, 16), "image/png");

    let response = setup
        .send_post_request_with_key(
            "/api/uploads/commit",
            json!({"post_id": "post42", "raw_key": raw_key}),
            Some("wrong"),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(setup.store.keys(), vec![raw_key.to_string()]);
}

#[tokio::test]
async fn test_correct_api_key_is_accepted() {
    let setup = TestSetup::new();

    let response = setup
        .send_post_request_with_key(
            "/api/uploads/presign",
            payload_for("presign"),
            Some(TEST_API_KEY),
        )
        .await
        .expect("Failed to send request");

    assert_eq!(response.status(), StatusCode::OK);
}
