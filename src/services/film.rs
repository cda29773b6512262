use std::sync::Arc;

use uuid::Uuid;

use super::{cached_list, cached_object};
use crate::{
    assemble,
    cache::CacheManager,
    keys::{self, Kind},
    models::{Film, FilmDocument},
    query::FilmQuery,
    store::{CatalogStore, StoreResult},
};

/// Films are cached as stored documents and assembled on every read.
#[derive(Clone)]
pub struct FilmService {
    cache: CacheManager,
    store: Arc<dyn CatalogStore>,
}

impl FilmService {
    pub fn new(cache: CacheManager, store: Arc<dyn CatalogStore>) -> Self {
        Self { cache, store }
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<Film>> {
        let key = keys::object_key(Kind::Film, id);
        let doc: Option<FilmDocument> =
            cached_object(&self.cache, &key, || self.store.get_film(id)).await?;
        Ok(doc.as_ref().map(assemble::film))
    }

    pub async fn search(&self, query: &FilmQuery) -> StoreResult<Option<Vec<Film>>> {
        let key = keys::films_key(query);
        let docs: Option<Vec<FilmDocument>> =
            cached_list(&self.cache, &key, || self.store.search_films(query)).await?;
        Ok(docs.map(|docs| docs.iter().map(assemble::film).collect()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        models::NamedRef,
        pagination::Page,
        services::testing::{CountingCatalog, cache},
    };

    fn doc(title: &str, rating: f64) -> FilmDocument {
        FilmDocument {
            id: Uuid::new_v4(),
            title: title.into(),
            description: None,
            imdb_rating: Some(rating),
            genre: vec![],
            actors: vec![NamedRef { id: Uuid::new_v4(), name: "Ann".into() }],
            writers: vec![],
            directors: vec![],
        }
    }

    #[tokio::test]
    async fn miss_reads_store_and_fills_cache() {
        let store = Arc::new(CountingCatalog::default());
        let film = doc("Star wars", 2.0);
        store.inner.insert_film(film.clone()).await;
        let (cache, _) = cache();
        let service = FilmService::new(cache.clone(), store.clone());

        let got = service.get_by_id(film.id).await.unwrap().unwrap();
        assert_eq!(got.id, film.id);
        assert_eq!(got.actors_names, vec!["Ann".to_string()]);
        assert_eq!(store.calls(), 1);

        let cached: Option<FilmDocument> = cache.get_object(&format!("film_{}", film.id)).await;
        assert_eq!(cached, Some(film));
    }

    #[tokio::test]
    async fn hit_never_touches_store() {
        let store = Arc::new(CountingCatalog::default());
        let film = doc("Star wars", 2.0);
        let (cache, _) = cache();
        cache.save_object(&format!("film_{}", film.id), &film).await;
        let service = FilmService::new(cache, store.clone());

        let got = service.get_by_id(film.id).await.unwrap();
        assert_eq!(got.map(|f| f.title), Some("Star wars".to_string()));
        assert_eq!(store.calls(), 0);
    }

    #[tokio::test]
    async fn absent_film_is_none_and_not_cached() {
        let store = Arc::new(CountingCatalog::default());
        let (cache, _) = cache();
        let service = FilmService::new(cache, store.clone());

        let id = Uuid::new_v4();
        assert_eq!(service.get_by_id(id).await.unwrap(), None);
        assert_eq!(service.get_by_id(id).await.unwrap(), None);
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn search_results_are_cached_per_key() {
        let store = Arc::new(CountingCatalog::default());
        store.inner.insert_film(doc("Star wars", 8.0)).await;
        store.inner.insert_film(doc("Star trek", 1.0)).await;
        let (cache, _) = cache();
        let service = FilmService::new(cache, store.clone());

        let asc = FilmQuery::new(Some("star"), None, Some("+imdb_rating"), Page::default());
        let first = service.search(&asc).await.unwrap().unwrap();
        assert_eq!(first[0].imdb_rating, Some(1.0));
        let again = service.search(&asc).await.unwrap().unwrap();
        assert_eq!(first, again);
        assert_eq!(store.calls(), 1);

        let desc = FilmQuery::new(Some("star"), None, Some("-imdb_rating"), Page::default());
        let other = service.search(&desc).await.unwrap().unwrap();
        assert_eq!(other[0].imdb_rating, Some(8.0));
        assert_eq!(store.calls(), 2);
    }

    #[tokio::test]
    async fn empty_search_is_none() {
        let store = Arc::new(CountingCatalog::default());
        let (cache, _) = cache();
        let service = FilmService::new(cache, store);
        let query = FilmQuery::new(Some("oqwieuryqowieury"), None, None, Page::default());
        assert_eq!(service.search(&query).await.unwrap(), None);
    }

    #[tokio::test]
    async fn store_failure_propagates() {
        let store = Arc::new(CountingCatalog::default());
        store.fail.store(true, std::sync::atomic::Ordering::SeqCst);
        let (cache, _) = cache();
        let service = FilmService::new(cache, store);
        assert!(service.get_by_id(Uuid::new_v4()).await.is_err());
    }
}
