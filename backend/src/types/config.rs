//! Process configuration, read once at startup

use std::{env, fmt, time::Duration};

use aws_config::{retry::RetryConfig, timeout::TimeoutConfig, BehaviorVersion};
use aws_sdk_s3::config::{
    Credentials, Region, RequestChecksumCalculation, ResponseChecksumValidation,
};
use axum::http::HeaderValue;
use thiserror::Error;
use tracing::warn;
use url::Url;

use super::Environment;

/// API key used outside production when `API_KEY` is unset. Never deploy with it.
pub const DEV_API_KEY_FALLBACK: &str = "dev-123";

const DEFAULT_REGION: &str = "auto";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000";
const DEFAULT_STORE_TIMEOUT_SECS: u64 = 30;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Configuration problems detected at startup
#[derive(Error, Debug)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("{0} environment variable is not set")]
    Missing(&'static str),

    /// A variable holds an unusable value
    #[error("Invalid value for {name}: {reason}")]
    Invalid {
        /// Variable name
        name: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Connection settings for the S3-compatible store
#[derive(Clone)]
pub struct StoreConfig {
    /// Endpoint URL, always with an http(s) scheme
    pub endpoint_url: String,
    /// Access key id
    pub access_key_id: String,
    /// Secret access key
    pub secret_access_key: String,
    /// Signing region
    pub region: String,
    /// Bucket holding raw and published objects
    pub bucket: String,
    /// Upper bound for a single store operation
    pub operation_timeout: Duration,
}

impl fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreConfig")
            .field("endpoint_url", &self.endpoint_url)
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"<redacted>")
            .field("region", &self.region)
            .field("bucket", &self.bucket)
            .field("operation_timeout", &self.operation_timeout)
            .finish()
    }
}

impl StoreConfig {
    /// S3 client configuration for this store
    ///
    /// Retries are disabled and every operation is bounded by
    /// `operation_timeout`; the pipeline surfaces failures immediately.
    #[must_use]
    pub fn s3_client_config(&self) -> aws_sdk_s3::Config {
        let credentials = Credentials::new(
            &self.access_key_id,
            &self.secret_access_key,
            None,
            None,
            "showoff-backend",
        );

        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(self.operation_timeout)
            .build();

        aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .endpoint_url(&self.endpoint_url)
            .region(Region::new(self.region.clone()))
            .credentials_provider(credentials)
            // R2 and LocalStack both accept path-style addressing
            .force_path_style(true)
            // Presigned PUTs must not demand checksum headers from browsers
            .request_checksum_calculation(RequestChecksumCalculation::WhenRequired)
            .response_checksum_validation(ResponseChecksumValidation::WhenRequired)
            .retry_config(RetryConfig::disabled())
            .timeout_config(timeout_config)
            .build()
    }
}

/// Immutable application configuration
#[derive(Clone)]
pub struct AppConfig {
    /// Deployment stage
    pub environment: Environment,
    /// Object store settings
    pub store: StoreConfig,
    /// Base of public image URLs, without trailing slash
    pub public_base_url: String,
    /// Shared secret expected in the `x-api-key` header
    pub api_key: String,
    /// Listening port
    pub port: u16,
    /// Origins allowed by CORS
    pub cors_allowed_origins: Vec<HeaderValue>,
    /// Upper bound for handling one request
    pub request_timeout: Duration,
}

impl fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppConfig")
            .field("environment", &self.environment)
            .field("store", &self.store)
            .field("public_base_url", &self.public_base_url)
            .field("api_key", &"<redacted>")
            .field("port", &self.port)
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl AppConfig {
    /// Reads the configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first missing or invalid variable
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Reads the configuration through `lookup`, which maps a variable name to its value
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first missing or invalid variable
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let required = |name: &'static str| var(name).ok_or(ConfigError::Missing(name));

        let environment = Environment::parse(var("APP_ENV").as_deref())?;

        let endpoint_url = required("R2_ENDPOINT")?;
        validate_endpoint(&endpoint_url)?;

        let store = StoreConfig {
            endpoint_url,
            access_key_id: required("R2_ACCESS_KEY_ID")?,
            secret_access_key: required("R2_SECRET_ACCESS_KEY")?,
            region: var("R2_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            bucket: required("R2_BUCKET")?,
            operation_timeout: parse_secs(
                "STORE_TIMEOUT_SECS",
                var("STORE_TIMEOUT_SECS"),
                DEFAULT_STORE_TIMEOUT_SECS,
            )?,
        };

        let public_base_url = required("R2_PUBLIC_BASE")?
            .trim_end_matches('/')
            .to_string();
        if public_base_url.is_empty() {
            return Err(ConfigError::Missing("R2_PUBLIC_BASE"));
        }

        let api_key = resolve_api_key(environment, var("API_KEY"))?;

        let port = match var("PORT") {
            Some(value) => value.parse().map_err(|e| ConfigError::Invalid {
                name: "PORT",
                reason: format!("{value:?}: {e}"),
            })?,
            None => DEFAULT_PORT,
        };

        let cors_allowed_origins = parse_origins(
            &var("CORS_ALLOWED_ORIGINS").unwrap_or_else(|| DEFAULT_CORS_ORIGINS.to_string()),
        )?;

        let request_timeout = parse_secs(
            "REQUEST_TIMEOUT_SECS",
            var("REQUEST_TIMEOUT_SECS"),
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?;

        Ok(Self {
            environment,
            store,
            public_base_url,
            api_key,
            port,
            cors_allowed_origins,
            request_timeout,
        })
    }
}

fn validate_endpoint(endpoint: &str) -> Result<(), ConfigError> {
    let url = Url::parse(endpoint).map_err(|e| ConfigError::Invalid {
        name: "R2_ENDPOINT",
        reason: format!("{endpoint:?}: {e}"),
    })?;

    if matches!(url.scheme(), "http" | "https") {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            name: "R2_ENDPOINT",
            reason: format!("{endpoint:?} must use an http or https scheme"),
        })
    }
}

fn resolve_api_key(environment: Environment, value: Option<String>) -> Result<String, ConfigError> {
    match value {
        Some(key) if key == DEV_API_KEY_FALLBACK && !environment.allows_default_api_key() => {
            Err(ConfigError::Invalid {
                name: "API_KEY",
                reason: "the development default key cannot be used in production".to_string(),
            })
        }
        Some(key) => Ok(key),
        None if environment.allows_default_api_key() => {
            warn!(
                "API_KEY not set, falling back to the development default key; \
                 do not expose this instance publicly"
            );
            Ok(DEV_API_KEY_FALLBACK.to_string())
        }
        None => Err(ConfigError::Missing("API_KEY")),
    }
}

fn parse_secs(name: &'static str, value: Option<String>, default: u64) -> Result<Duration, ConfigError> {
    let Some(value) = value else {
        return Ok(Duration::from_secs(default));
    };

    match value.parse::<u64>() {
        Ok(secs) if secs > 0 => Ok(Duration::from_secs(secs)),
        _ => Err(ConfigError::Invalid {
            name,
            reason: format!("{value:?} is not a positive number of seconds"),
        }),
    }
}

fn parse_origins(value: &str) -> Result<Vec<HeaderValue>, ConfigError> {
    value
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|e| ConfigError::Invalid {
                name: "CORS_ALLOWED_ORIGINS",
                reason: format!("{origin:?}: {e}"),
            })
        })
        .collect()
}
