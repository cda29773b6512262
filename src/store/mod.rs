pub mod elastic;
pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    models::{FilmDocument, GenreDocument, PersonAssociations, PersonDocument},
    pagination::Page,
    query::FilmQuery,
};

pub use self::{elastic::ElasticCatalog, memory::MemoryCatalog};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("search backend request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("search backend returned {status} for {index}")]
    Status { index: &'static str, status: u16 },

    #[error("undecodable document in {index}: {source}")]
    Decode {
        index: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn get_film(&self, id: Uuid) -> StoreResult<Option<FilmDocument>>;

    async fn get_genre(&self, id: Uuid) -> StoreResult<Option<GenreDocument>>;

    async fn get_person(&self, id: Uuid) -> StoreResult<Option<PersonDocument>>;

    async fn list_genres(&self, page: Page) -> StoreResult<Vec<GenreDocument>>;

    /// Paged, sorted film listing with optional genre filter and fuzzy title match.
    async fn search_films(&self, query: &FilmQuery) -> StoreResult<Vec<FilmDocument>>;

    /// Fuzzy match on person name.
    async fn search_persons(&self, text: &str, page: Page) -> StoreResult<Vec<PersonDocument>>;

    /// Films crediting the person in any role.
    async fn films_by_person(&self, person_id: Uuid, page: Page) -> StoreResult<Vec<FilmDocument>>;

    /// Every role the person holds and every film they appear in.
    async fn find_associations(&self, person_id: Uuid) -> StoreResult<PersonAssociations>;
}
