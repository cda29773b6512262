use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, sea_query::OnConflict,
};
use tracing::{debug, warn};

use super::{CacheError, CacheStore};
use crate::{db, entities::cache_entry};

const PURGE_EVERY: u64 = 500;

/// Cache rows in a SQL table, filtered by `expires_at` on read.
#[derive(Clone)]
pub struct SqlCache {
    db: DatabaseConnection,
    writes: Arc<AtomicU64>,
    purge_every: u64,
}

impl SqlCache {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db, writes: Arc::new(AtomicU64::new(0)), purge_every: PURGE_EVERY }
    }

    /// Purge expired rows after this many writes.
    pub fn with_purge_every(mut self, writes: u64) -> Self {
        self.purge_every = writes.max(1);
        self
    }

    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let db = db::connect_and_migrate(url).await?;
        let cache = Self::new(db);
        let purged = cache.purge_expired().await?;
        tracing::info!(purged, "sql cache ready");
        Ok(cache)
    }

    /// Drops rows that have already expired; reads ignore them either way.
    pub async fn purge_expired(&self) -> Result<u64, CacheError> {
        let res = cache_entry::Entity::delete_many()
            .filter(cache_entry::Column::ExpiresAt.lte(now_sec()))
            .exec(&self.db)
            .await?;
        Ok(res.rows_affected)
    }

    async fn purge_if_due(&self) {
        let written = self.writes.fetch_add(1, Ordering::Relaxed) + 1;
        if written % self.purge_every != 0 {
            return;
        }
        match self.purge_expired().await {
            Ok(purged) => debug!(purged, "purged expired cache rows"),
            Err(err) => warn!(error = %err, "cache purge failed"),
        }
    }
}

#[async_trait]
impl CacheStore for SqlCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let row = cache_entry::Entity::find_by_id(key.to_string())
            .filter(cache_entry::Column::ExpiresAt.gt(now_sec()))
            .one(&self.db)
            .await?;
        Ok(row.map(|r| r.value))
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let ttl_secs = i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX);
        let model = cache_entry::ActiveModel {
            key: Set(key.to_string()),
            value: Set(value),
            expires_at: Set(now_sec().saturating_add(ttl_secs)),
        };

        cache_entry::Entity::insert(model)
            .on_conflict(
                OnConflict::column(cache_entry::Column::Key)
                    .update_columns([cache_entry::Column::Value, cache_entry::Column::ExpiresAt])
                    .to_owned(),
            )
            .exec(&self.db)
            .await?;

        self.purge_if_due().await;
        Ok(())
    }
}

fn now_sec() -> i64 {
    jiff::Timestamp::now().as_second()
}
