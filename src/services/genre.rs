use std::sync::Arc;

use uuid::Uuid;

use super::{cached_list, cached_object};
use crate::{
    assemble,
    cache::CacheManager,
    keys::{self, Kind},
    models::{GenreDetail, GenreDocument, GenreSummary},
    pagination::Page,
    store::{CatalogStore, StoreResult},
};

#[derive(Clone)]
pub struct GenreService {
    cache: CacheManager,
    store: Arc<dyn CatalogStore>,
}

impl GenreService {
    pub fn new(cache: CacheManager, store: Arc<dyn CatalogStore>) -> Self {
        Self { cache, store }
    }

    pub async fn get_by_id(&self, id: Uuid) -> StoreResult<Option<GenreDetail>> {
        let key = keys::object_key(Kind::Genre, id);
        let doc: Option<GenreDocument> =
            cached_object(&self.cache, &key, || self.store.get_genre(id)).await?;
        Ok(doc.as_ref().map(assemble::genre_detail))
    }

    pub async fn list(&self, page: Page) -> StoreResult<Option<Vec<GenreSummary>>> {
        let key = keys::genres_key(page);
        let docs: Option<Vec<GenreDocument>> =
            cached_list(&self.cache, &key, || self.store.list_genres(page)).await?;
        Ok(docs.map(|docs| docs.iter().map(assemble::genre_summary).collect()))
    }
}
