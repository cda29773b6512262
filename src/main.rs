use std::sync::Arc;

use anyhow::Context;
use movies_api::{
    AppState,
    cache::{self, CacheManager},
    config::Config,
    routes,
    store::ElasticCatalog,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            std::env::var("RUST_LOG")
                .unwrap_or_else(|_| "info,movies_api=debug,sea_orm=warn".to_string()),
        )
        .init();

    let config = Arc::new(Config::from_env()?);

    let http = reqwest::Client::builder()
        .user_agent(format!("{}/{}", config.project_name, env!("CARGO_PKG_VERSION")))
        .timeout(config.elastic_timeout)
        .build()?;
    let catalog = ElasticCatalog::new(http, config.elastic_url.clone());

    let backend = cache::connect(&config.cache_url)
        .await
        .with_context(|| format!("connecting cache at {}", config.cache_url))?;
    let cache = CacheManager::new(backend, config.cache_ttl);
    tracing::info!(ttl_secs = cache.ttl().as_secs(), "cache ready");

    let state = Arc::new(AppState::new(config.clone(), Arc::new(catalog), cache));
    let app = routes::router(state);

    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    tracing::info!(
        addr = %config.addr,
        project = %config.project_name,
        elastic = %config.elastic_url,
        "listening"
    );
    axum::serve(listener, app).await?;

    Ok(())
}
