mod config;
mod environment;
mod error;
mod extractors;

pub use config::{AppConfig, ConfigError, StoreConfig, DEV_API_KEY_FALLBACK};
pub use environment::Environment;
pub use error::{ApiErrorResponse, AppError};
pub use extractors::ValidatedJson;
