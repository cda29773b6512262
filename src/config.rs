use std::{net::SocketAddr, time::Duration};

use anyhow::Context;

#[derive(Clone, Debug)]
pub struct Config {
    pub addr: SocketAddr,
    pub project_name: String,
    pub elastic_url: String,
    pub elastic_timeout: Duration,
    pub cache_url: String,
    pub cache_ttl: Duration,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 =
            std::env::var("PORT").unwrap_or_else(|_| "8000".to_string()).parse().context("PORT")?;

        let project_name = std::env::var("PROJECT_NAME").unwrap_or_else(|_| "movies".to_string());

        let elastic_url = std::env::var("ELASTIC_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:9200".to_string());

        let elastic_timeout_secs: u64 =
            std::env::var("ELASTIC_TIMEOUT_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(10);

        let cache_url =
            std::env::var("CACHE_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string());

        let cache_ttl_secs: u64 =
            std::env::var("CACHE_TTL_SECS").ok().and_then(|s| s.parse().ok()).unwrap_or(300);

        Ok(Self {
            addr: format!("{host}:{port}").parse().context("HOST/PORT")?,
            project_name,
            elastic_url,
            elastic_timeout: Duration::from_secs(elastic_timeout_secs),
            cache_url,
            cache_ttl: Duration::from_secs(cache_ttl_secs),
        })
    }
}
