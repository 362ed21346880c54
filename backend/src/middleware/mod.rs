pub mod auth;

pub use auth::{api_key_middleware, AccessGuard, API_KEY_HEADER};
