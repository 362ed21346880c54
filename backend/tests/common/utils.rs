use axum::response::Response;
use http_body_util::BodyExt;

/// Parse response body to JSON
pub async fn parse_response_body(response: Response) -> serde_json::Value {
    let body = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&body).unwrap()
}

/// Assert the error envelope carries `code`
pub fn assert_error_code(body: &serde_json::Value, code: &str) {
    assert_eq!(body["error"]["code"], code, "unexpected body: {body}");
    assert!(body["error"]["message"].is_string());
    assert!(body["allowRetry"].is_boolean());
}
