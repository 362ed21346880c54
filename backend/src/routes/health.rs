use aide::axum::IntoApiResponse;
use axum::Json;
use schemars::JsonSchema;
use serde::Serialize;

/// Name reported by the root endpoint
pub const SERVICE_NAME: &str = "showoff-backend";

#[derive(Debug, Serialize, JsonSchema)]
pub struct HealthResponse {
    ok: bool,
    /// Service name, reported on `/` only
    #[serde(skip_serializing_if = "Option::is_none")]
    service: Option<String>,
    /// Current version of the application
    semver: String,
    /// Commit hash of the current build (if available)
    rev: Option<String>,
}

impl HealthResponse {
    fn new(service: Option<&str>) -> Self {
        Self {
            ok: true,
            service: service.map(ToString::to_string),
            semver: env!("CARGO_PKG_VERSION").to_string(),
            rev: option_env!("GIT_REV").map(ToString::to_string),
        }
    }
}

/// Health check endpoint
///
/// Returns a static ok indicator and version information of the service.
/// This endpoint can be used for monitoring and deployment verification.
pub async fn handler() -> impl IntoApiResponse {
    Json(HealthResponse::new(None))
}

/// Root endpoint, the health indicator plus the service name
pub async fn root() -> impl IntoApiResponse {
    Json(HealthResponse::new(Some(SERVICE_NAME)))
}
