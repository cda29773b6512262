pub mod film;
pub mod genre;
pub mod person;

use std::future::Future;

use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

use crate::{cache::CacheManager, store::StoreResult};

pub use self::{film::FilmService, genre::GenreService, person::PersonService};

pub(crate) async fn cached_object<T, F, Fut>(
    cache: &CacheManager,
    key: &str,
    fetch: F,
) -> StoreResult<Option<T>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<Option<T>>>,
{
    if let Some(hit) = cache.get_object(key).await {
        return Ok(Some(hit));
    }
    let Some(found) = fetch().await? else {
        debug!(key = %key, "not found in catalog");
        return Ok(None);
    };
    cache.save_object(key, &found).await;
    Ok(Some(found))
}

pub(crate) async fn cached_list<T, F, Fut>(
    cache: &CacheManager,
    key: &str,
    fetch: F,
) -> StoreResult<Option<Vec<T>>>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = StoreResult<Vec<T>>>,
{
    if let Some(hit) = cache.get_list(key).await {
        return Ok(Some(hit));
    }
    let found = fetch().await?;
    if found.is_empty() {
        debug!(key = %key, "empty result from catalog");
        return Ok(None);
    }
    cache.save_list(key, &found).await;
    Ok(Some(found))
}
