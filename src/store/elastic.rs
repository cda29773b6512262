use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use super::{CatalogStore, StoreError, StoreResult};
use crate::{
    models::{FilmDocument, GenreDocument, PersonAssociations, PersonDocument},
    pagination::Page,
    query::{self, FilmQuery},
};

pub const MOVIES_INDEX: &str = "movies";
pub const GENRES_INDEX: &str = "genres";
pub const PERSONS_INDEX: &str = "persons";

/// Elasticsearch refuses `from + size` beyond this.
const MAX_RESULT_WINDOW: u64 = 10_000;
const ASSOCIATION_BATCH: u64 = 100;

pub struct ElasticCatalog {
    client: reqwest::Client,
    base_url: String,
}

impl ElasticCatalog {
    pub fn new(client: reqwest::Client, base_url: String) -> Self {
        Self { client, base_url }
    }

    fn url(&self, index: &str, path: &str) -> String {
        format!("{}/{}/{}", self.base_url.trim_end_matches('/'), index, path)
    }

    async fn get_doc<T: DeserializeOwned>(
        &self,
        index: &'static str,
        id: Uuid,
    ) -> StoreResult<Option<T>> {
        let resp = self.client.get(self.url(index, &format!("_doc/{id}"))).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(index, %id, "document not found");
            return Ok(None);
        }
        let body = checked(index, resp)?.bytes().await?;
        let doc: GetResponse<T> =
            serde_json::from_slice(&body).map_err(|source| StoreError::Decode { index, source })?;
        Ok(doc.source.filter(|_| doc.found))
    }

    async fn search<T: DeserializeOwned>(
        &self,
        index: &'static str,
        mut body: Value,
    ) -> StoreResult<Vec<T>> {
        if !clamp_to_window(&mut body) {
            debug!(index, "page beyond result window");
            return Ok(Vec::new());
        }

        let resp = self.client.post(self.url(index, "_search")).json(&body).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            debug!(index, "index not found");
            return Ok(Vec::new());
        }
        let raw = checked(index, resp)?.bytes().await?;
        let found: SearchResponse<T> =
            serde_json::from_slice(&raw).map_err(|source| StoreError::Decode { index, source })?;

        debug!(index, hits = found.hits.hits.len(), "search completed");
        Ok(found.hits.hits.into_iter().map(|h| h.source).collect())
    }
}

fn checked(index: &'static str, resp: reqwest::Response) -> StoreResult<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        Err(StoreError::Status { index, status: status.as_u16() })
    }
}

/// Shrinks `size` so `from + size` stays inside the result window. Returns
/// false when `from` alone is already past it.
fn clamp_to_window(body: &mut Value) -> bool {
    let from = body["from"].as_u64().unwrap_or(0);
    let size = body["size"].as_u64().unwrap_or(0);
    if from >= MAX_RESULT_WINDOW {
        return false;
    }
    if from + size > MAX_RESULT_WINDOW {
        body["size"] = Value::from(MAX_RESULT_WINDOW - from);
    }
    true
}

#[async_trait]
impl CatalogStore for ElasticCatalog {
    async fn get_film(&self, id: Uuid) -> StoreResult<Option<FilmDocument>> {
        self.get_doc(MOVIES_INDEX, id).await
    }

    async fn get_genre(&self, id: Uuid) -> StoreResult<Option<GenreDocument>> {
        self.get_doc(GENRES_INDEX, id).await
    }

    async fn get_person(&self, id: Uuid) -> StoreResult<Option<PersonDocument>> {
        self.get_doc(PERSONS_INDEX, id).await
    }

    async fn list_genres(&self, page: Page) -> StoreResult<Vec<GenreDocument>> {
        self.search(GENRES_INDEX, query::match_all(page)).await
    }

    async fn search_films(&self, query: &FilmQuery) -> StoreResult<Vec<FilmDocument>> {
        self.search(MOVIES_INDEX, query::film_search(query)).await
    }

    async fn search_persons(&self, text: &str, page: Page) -> StoreResult<Vec<PersonDocument>> {
        self.search(PERSONS_INDEX, query::person_name_search(text, page)).await
    }

    async fn films_by_person(&self, person_id: Uuid, page: Page) -> StoreResult<Vec<FilmDocument>> {
        let body = query::films_by_person(person_id, page.offset(), page.limit());
        self.search(MOVIES_INDEX, body).await
    }

    async fn find_associations(&self, person_id: Uuid) -> StoreResult<PersonAssociations> {
        let mut associations = PersonAssociations::default();
        let mut from = 0;
        while from < MAX_RESULT_WINDOW {
            let body = query::films_by_person(person_id, from, ASSOCIATION_BATCH);
            let films: Vec<FilmDocument> = self.search(MOVIES_INDEX, body).await?;
            for film in &films {
                associations.scan(person_id, film);
            }
            if (films.len() as u64) < ASSOCIATION_BATCH {
                break;
            }
            from += ASSOCIATION_BATCH;
        }
        debug!(
            %person_id,
            roles = associations.role.len(),
            films = associations.film_ids.len(),
            "collected person associations"
        );
        Ok(associations)
    }
}

#[derive(Debug, Deserialize)]
struct GetResponse<T> {
    #[serde(default)]
    found: bool,
    #[serde(rename = "_source")]
    source: Option<T>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse<T> {
    hits: Hits<T>,
}

#[derive(Debug, Deserialize)]
struct Hits<T> {
    hits: Vec<Hit<T>>,
}

#[derive(Debug, Deserialize)]
struct Hit<T> {
    #[serde(rename = "_source")]
    source: T,
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;

    use super::*;
    use crate::models::Role;

    fn catalog(server: &MockServer) -> ElasticCatalog {
        ElasticCatalog::new(reqwest::Client::new(), server.base_url())
    }

    fn hits(sources: Vec<Value>) -> Value {
        let hits: Vec<Value> = sources.into_iter().map(|s| json!({ "_source": s })).collect();
        json!({ "hits": { "hits": hits } })
    }

    fn film_crediting(person_id: Uuid) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "title": "The Star",
            "imdb_rating": 7.1,
            "genre": [],
            "actors": [{ "id": person_id, "name": "Ann" }],
            "writers": [],
            "directors": [],
        })
    }

    #[test]
    fn window_is_respected() {
        let mut body = json!({ "from": 0, "size": 50 });
        assert!(clamp_to_window(&mut body));
        assert_eq!(body["size"], 50);

        let mut body = json!({ "from": 9_990, "size": 50 });
        assert!(clamp_to_window(&mut body));
        assert_eq!(body["size"], 10);

        let mut body = json!({ "from": 10_000, "size": 10 });
        assert!(!clamp_to_window(&mut body));
    }

    #[test]
    fn search_response_extracts_sources() {
        let id = Uuid::new_v4();
        let raw = json!({
            "took": 1,
            "hits": { "total": { "value": 1 }, "hits": [
                { "_index": "persons", "_id": id, "_source": { "id": id, "name": "George Lucas" } }
            ]}
        });
        let parsed: SearchResponse<PersonDocument> = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.hits.hits[0].source.name, "George Lucas");
    }

    #[test]
    fn get_response_without_source_is_absent() {
        let raw = json!({ "_index": "movies", "_id": "x", "found": false });
        let parsed: GetResponse<FilmDocument> = serde_json::from_value(raw).unwrap();
        assert!(parsed.source.is_none());
    }

    #[test]
    fn urls_tolerate_trailing_slash() {
        let catalog = ElasticCatalog::new(reqwest::Client::new(), "http://es:9200/".into());
        assert_eq!(catalog.url(MOVIES_INDEX, "_search"), "http://es:9200/movies/_search");
    }

    #[tokio::test]
    async fn found_document_is_returned() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        let mock = server
            .mock_async(|when, then| {
                when.method("GET").path(format!("/persons/_doc/{id}"));
                then.status(200).json_body(json!({
                    "_index": "persons",
                    "_id": id,
                    "found": true,
                    "_source": { "id": id, "name": "George Lucas" },
                }));
            })
            .await;

        let person = catalog(&server).get_person(id).await.unwrap().unwrap();
        assert_eq!(person.name, "George Lucas");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn missing_document_is_none() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        server
            .mock_async(|when, then| {
                when.method("GET").path(format!("/movies/_doc/{id}"));
                then.status(404)
                    .json_body(json!({ "_index": "movies", "_id": id, "found": false }));
            })
            .await;

        assert_eq!(catalog(&server).get_film(id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn missing_index_is_empty_result() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/genres/_search");
                then.status(404)
                    .json_body(json!({ "error": { "type": "index_not_found_exception" } }));
            })
            .await;

        let genres = catalog(&server).list_genres(Page::default()).await.unwrap();
        assert!(genres.is_empty());
    }

    #[tokio::test]
    async fn server_error_is_status_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method("POST").path("/movies/_search");
                then.status(500).body("cluster on fire");
            })
            .await;

        let query = FilmQuery::new(Some("star"), None, None, Page::default());
        let err = catalog(&server).search_films(&query).await.unwrap_err();
        assert!(matches!(err, StoreError::Status { index: "movies", status: 500 }), "{err}");
    }

    #[tokio::test]
    async fn undecodable_body_is_decode_error() {
        let server = MockServer::start_async().await;
        let id = Uuid::new_v4();
        server
            .mock_async(|when, then| {
                when.method("GET").path(format!("/genres/_doc/{id}"));
                then.status(200).body("<html>proxy error</html>");
            })
            .await;

        let err = catalog(&server).get_genre(id).await.unwrap_err();
        assert!(matches!(err, StoreError::Decode { index: "genres", .. }), "{err}");
    }

    #[tokio::test]
    async fn unreachable_backend_is_transport_error() {
        let catalog = ElasticCatalog::new(reqwest::Client::new(), "http://127.0.0.1:1".into());
        let err = catalog.get_film(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, StoreError::Transport(_)), "{err}");
    }

    #[tokio::test]
    async fn associations_page_through_full_batches() {
        let server = MockServer::start_async().await;
        let person_id = Uuid::new_v4();
        let full = hits((0..ASSOCIATION_BATCH).map(|_| film_crediting(person_id)).collect());
        let short = hits(vec![film_crediting(person_id)]);
        let first_batch = server
            .mock_async(|when, then| {
                when.method("POST").path("/movies/_search").body_includes(r#""from":0,"#);
                then.status(200).json_body(full.clone());
            })
            .await;
        let second_batch = server
            .mock_async(|when, then| {
                when.method("POST").path("/movies/_search").body_includes(r#""from":100,"#);
                then.status(200).json_body(short.clone());
            })
            .await;

        let found = catalog(&server).find_associations(person_id).await.unwrap();
        assert_eq!(found.film_ids.len(), 101);
        assert_eq!(found.role.into_iter().collect::<Vec<_>>(), [Role::Actor]);
        first_batch.assert_async().await;
        second_batch.assert_async().await;
    }
}
