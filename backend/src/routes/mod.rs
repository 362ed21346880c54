mod docs;
mod health;
pub mod uploads;

use aide::axum::{
    routing::{get, post},
    ApiRouter,
};
use axum::middleware::from_fn;

use crate::{middleware::api_key_middleware, types::Environment};

pub use health::SERVICE_NAME;

/// Creates the router with all handler routes
///
/// The upload routes require the `x-api-key` header. Health is open, and the
/// docs routes are only mounted where the environment shows them.
pub fn handler(environment: Environment) -> ApiRouter {
    let mut public_routes = ApiRouter::new()
        .api_route("/", get(health::root))
        .api_route("/health", get(health::handler));

    if environment.show_api_docs() {
        public_routes = public_routes.merge(docs::handler());
    }

    let protected_routes = ApiRouter::new()
        .api_route("/api/uploads/presign", post(uploads::presign))
        .api_route("/api/uploads/commit", post(uploads::commit))
        .route_layer(from_fn(api_key_middleware));

    public_routes.merge(protected_routes)
}
