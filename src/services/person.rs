use std::sync::Arc;

use futures::{StreamExt, TryFutureExt, TryStreamExt, stream};
use tracing::debug;
use uuid::Uuid;

use super::cached_list;
use crate::{
    assemble,
    cache::CacheManager,
    keys::{self, Kind},
    models::{FilmShort, Person, PersonAssociations, PersonDocument},
    pagination::Page,
    store::{CatalogStore, StoreResult},
};

/// Association lookups in flight at once while merging a search page.
const MERGE_CONCURRENCY: usize = 4;

/// Persons are cached already merged with their roles and films, so a
/// cached record also answers later association lookups.
#[derive(Clone)]
pub struct PersonService {
    cache: CacheManager,
    store: Arc<dyn CatalogStore>,
}

impl PersonService {
    pub fn new(cache: CacheManager, store: Arc<dyn CatalogStore>) -> Self {
        Self { cache, store }
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Person>> {
        let key = keys::object_key(Kind::Person, id);
        if let Some(hit) = self.cache.get_object::<Person>(&key).await {
            return Ok(Some(hit));
        }

        let (identity, associations) =
            futures::try_join!(self.store.get_person(id), self.associations(id))?;
        let Some(identity) = identity else {
            debug!(%id, "person not found in catalog");
            return Ok(None);
        };

        let person = assemble::person(identity, associations);
        self.cache.save_object(&key, &person).await;
        Ok(Some(person))
    }

    pub async fn search(&self, text: &str, page: Page) -> StoreResult<Option<Vec<Person>>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        let key = keys::person_search_key(text, page);
        cached_list(&self.cache, &key, || self.search_and_merge(text, page)).await
    }

    pub async fn films(&self, person_id: Uuid, page: Page) -> StoreResult<Option<Vec<FilmShort>>> {
        let key = keys::person_films_key(person_id, page);
        cached_list(&self.cache, &key, || {
            self.store
                .films_by_person(person_id, page)
                .map_ok(|docs| docs.iter().map(assemble::film_short).collect())
        })
        .await
    }

    /// Roles and films of a person, taken from a cached merged record when
    /// one exists.
    async fn associations(&self, id: Uuid) -> StoreResult<PersonAssociations> {
        let key = keys::object_key(Kind::Person, id);
        match self.cache.get_object::<Person>(&key).await {
            Some(cached) => Ok(cached.associations()),
            None => self.store.find_associations(id).await,
        }
    }

    async fn search_and_merge(&self, text: &str, page: Page) -> StoreResult<Vec<Person>> {
        let hits = self.store.search_persons(text, page).await?;
        debug!(query = %text, hits = hits.len(), "merging person search hits");
        stream::iter(hits)
            .map(|doc| self.merge(doc))
            .buffered(MERGE_CONCURRENCY)
            .try_collect()
            .await
    }

    async fn merge(&self, identity: PersonDocument) -> StoreResult<Person> {
        let associations = self.associations(identity.id).await?;
        let person = assemble::person(identity, associations);
        self.cache.save_object(&keys::object_key(Kind::Person, person.id), &person).await;
        Ok(person)
    }
}
