pub mod memory;
pub mod redis;
pub mod sql;

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};

pub use self::{memory::MemoryCache, redis::RedisCache, sql::SqlCache};

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("redis: {0}")]
    Redis(#[from] ::redis::RedisError),

    #[error("database: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("cache backend unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait CacheStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Clone)]
pub struct CacheManager {
    store: Arc<dyn CacheStore>,
    ttl: Duration,
}

impl CacheManager {
    pub fn new(store: Arc<dyn CacheStore>, ttl: Duration) -> Self {
        Self { store, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub async fn get_object<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = self.read(key).await?;
        match serde_json::from_str(&raw) {
            Ok(value) => {
                debug!(key = %key, "cache hit");
                Some(value)
            },
            Err(err) => {
                warn!(key = %key, error = %err, "discarding undecodable cache entry");
                None
            },
        }
    }

    pub async fn save_object<T: Serialize>(&self, key: &str, value: &T) {
        self.write(key, value).await;
    }

    /// An empty cached list counts as a miss.
    pub async fn get_list<T: DeserializeOwned>(&self, key: &str) -> Option<Vec<T>> {
        self.get_object::<Vec<T>>(key).await.filter(|items| !items.is_empty())
    }

    pub async fn save_list<T: Serialize>(&self, key: &str, items: &[T]) {
        self.write(key, items).await;
    }

    async fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key).await {
            Ok(Some(raw)) => Some(raw),
            Ok(None) => {
                debug!(key = %key, "cache miss");
                None
            },
            Err(err) => {
                warn!(key = %key, error = %err, "cache read failed, treating as miss");
                None
            },
        }
    }

    async fn write<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(err) => {
                warn!(key = %key, error = %err, "failed to encode cache entry");
                return;
            },
        };
        match self.store.set(key, raw, self.ttl).await {
            Ok(()) => debug!(key = %key, ttl_secs = self.ttl.as_secs(), "cache write"),
            Err(err) => warn!(key = %key, error = %err, "cache write failed"),
        }
    }
}

/// Picks a backend from the scheme of `url`.
pub async fn connect(url: &str) -> anyhow::Result<Arc<dyn CacheStore>> {
    let scheme = url.split_once(':').map(|(scheme, _)| scheme).unwrap_or_default();
    let store: Arc<dyn CacheStore> = match scheme {
        "redis" | "rediss" => Arc::new(RedisCache::connect(url).await?),
        "sqlite" => Arc::new(SqlCache::connect(url).await?),
        "memory" => Arc::new(MemoryCache::new()),
        other => anyhow::bail!("unsupported CACHE_URL scheme: {other:?}"),
    };
    Ok(store)
}
