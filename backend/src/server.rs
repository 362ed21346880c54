use std::{net::SocketAddr, sync::Arc};

use aide::openapi::OpenApi;
use axum::{http::header, Extension, Router};
use tokio::net::TcpListener;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::{
    middleware::AccessGuard,
    object_store::ObjectStore,
    routes,
    types::AppConfig,
    uploads::{policy::PRESIGN_TTL, CommitPipeline, UploadAuthorizer},
};

/// Assembles the application router on top of `store`
///
/// Every collaborator is built here from `config` and handed to the handlers
/// as an extension; nothing reads the process environment afterwards.
pub fn router(config: &AppConfig, store: Arc<dyn ObjectStore>) -> Router {
    let mut openapi = OpenApi::default();

    let authorizer = Arc::new(UploadAuthorizer::new(store.clone(), PRESIGN_TTL));
    let pipeline = Arc::new(CommitPipeline::new(store, config.public_base_url.clone()));
    let guard = Arc::new(AccessGuard::new(config.api_key.as_str()));

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(config.cors_allowed_origins.clone()))
        .allow_methods(AllowMethods::mirror_request())
        .allow_headers(AllowHeaders::mirror_request())
        .expose_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    routes::handler(config.environment)
        .finish_api(&mut openapi)
        .layer(Extension(openapi))
        .layer(Extension(authorizer))
        .layer(Extension(pipeline))
        .layer(Extension(guard))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(config.request_timeout))
}

/// Starts the server with the given configuration and object store
///
/// # Errors
///
/// Returns an error if the server fails to start or bind to the port
pub async fn start(config: Arc<AppConfig>, store: Arc<dyn ObjectStore>) -> anyhow::Result<()> {
    let router = router(&config, store);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(environment = ?config.environment, "Showoff upload service started on http://{addr}");

    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(anyhow::Error::from)
}

/// Resolves on SIGINT or, on unix, SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
}
