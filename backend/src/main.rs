use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use showoff_backend::{
    object_store::S3ObjectStore,
    server,
    types::{AppConfig, Environment},
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine, the process environment is authoritative
    dotenvy::dotenv().ok();

    let environment = Environment::from_env()?;
    let env_filter = EnvFilter::builder()
        .with_default_directive(environment.tracing_level().into())
        .from_env_lossy();

    // JSON logs for staging/production, human-readable for development
    if environment.json_logs() {
        fmt().json().with_env_filter(env_filter).init();
    } else {
        fmt().with_env_filter(env_filter).init();
    }

    let config = Arc::new(AppConfig::from_env()?);
    tracing::debug!(?config, "Configuration loaded");

    let s3_client = Arc::new(S3Client::from_conf(config.store.s3_client_config()));
    let store = Arc::new(S3ObjectStore::new(s3_client, config.store.bucket.clone()));

    server::start(config, store).await
}
