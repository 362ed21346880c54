//! Deployment stage

use std::env;

use tracing::Level;

use super::config::ConfigError;

/// Application environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Production environment
    Production,
    /// Staging environment
    Staging,
    /// Development environment
    Development,
}

impl Environment {
    /// Creates an Environment from the `APP_ENV` environment variable
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if `APP_ENV` holds an unknown stage
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::parse(env::var("APP_ENV").ok().as_deref())
    }

    /// Parses a stage name, defaulting to development when unset
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` for an unknown stage
    pub fn parse(value: Option<&str>) -> Result<Self, ConfigError> {
        let stage = value.unwrap_or("development").trim().to_lowercase();

        match stage.as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            _ => Err(ConfigError::Invalid {
                name: "APP_ENV",
                reason: format!("unknown environment {stage:?}"),
            }),
        }
    }

    /// Whether to show API docs
    #[must_use]
    pub const fn show_api_docs(&self) -> bool {
        matches!(self, Self::Development | Self::Staging)
    }

    /// Whether the built-in development API key may be used
    #[must_use]
    pub const fn allows_default_api_key(&self) -> bool {
        !matches!(self, Self::Production)
    }

    /// Whether logs should be emitted as JSON
    #[must_use]
    pub const fn json_logs(&self) -> bool {
        matches!(self, Self::Production | Self::Staging)
    }

    /// Default log level, overridable through `TRACING_LEVEL`
    #[must_use]
    pub fn tracing_level(&self) -> Level {
        env::var("TRACING_LEVEL")
            .ok()
            .and_then(|val| val.parse::<Level>().ok())
            .unwrap_or(match self {
                Self::Production | Self::Staging => Level::INFO,
                Self::Development => Level::DEBUG,
            })
    }
}
