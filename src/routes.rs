use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::get,
};
use axum_extra::extract::WithRejection;
use serde_json::{Value, json};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

use crate::{
    AppState,
    error::{
        AppError, AppResult, FILMS_NOT_FOUND, GENRES_NOT_FOUND, PERSON_FILMS_NOT_FOUND,
        PERSONS_NOT_FOUND,
    },
    models::{Film, FilmShort, GenreDetail, GenreSummary, Person},
    pagination::{FilmParams, PageParams, SearchParams},
    query::FilmQuery,
};

/// Film listings accept page 0 as an alias of the first page.
const FILMS_MIN_PAGE: i64 = 0;
const MIN_PAGE: i64 = 1;

type IdPath = WithRejection<Path<Uuid>, AppError>;
type Params<T> = WithRejection<Query<T>, AppError>;

pub fn router(state: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/films", get(list_films))
        .route("/films/search", get(search_films))
        .route("/films/{id}", get(film_details))
        .route("/genres", get(list_genres))
        .route("/genres/{id}", get(genre_details))
        .route("/persons/search", get(search_persons))
        .route("/persons/{id}/film", get(person_films))
        .route("/persons/{id}", get(person_details));

    Router::new()
        .nest("/api/v1", api)
        .route("/health", get(health))
        .with_state(state)
        .layer(CorsLayer::new().allow_origin(Any).allow_headers(Any))
        .layer(TraceLayer::new_for_http())
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn films_page(
    state: &AppState,
    params: FilmParams,
    text: Option<&str>,
) -> AppResult<Json<Vec<Film>>> {
    let page = params.page_params().validate(FILMS_MIN_PAGE).map_err(AppError::Validation)?;
    let query = FilmQuery::new(text, params.genre.as_deref(), params.sort.as_deref(), page);
    state.films.search(&query).await?.map(Json).ok_or(AppError::NotFound(FILMS_NOT_FOUND))
}

pub async fn list_films(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): Params<FilmParams>,
) -> AppResult<Json<Vec<Film>>> {
    films_page(&state, params, None).await
}

pub async fn search_films(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): Params<FilmParams>,
) -> AppResult<Json<Vec<Film>>> {
    let text = params.query.clone();
    films_page(&state, params, text.as_deref()).await
}

pub async fn film_details(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath,
) -> AppResult<Json<Film>> {
    state.films.get_by_id(id).await?.map(Json).ok_or(AppError::NotFound(FILMS_NOT_FOUND))
}

pub async fn list_genres(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): Params<PageParams>,
) -> AppResult<Json<Vec<GenreSummary>>> {
    let page = params.validate(MIN_PAGE).map_err(AppError::Validation)?;
    state.genres.list(page).await?.map(Json).ok_or(AppError::NotFound(GENRES_NOT_FOUND))
}

pub async fn genre_details(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath,
) -> AppResult<Json<GenreDetail>> {
    state.genres.get_by_id(id).await?.map(Json).ok_or(AppError::NotFound(GENRES_NOT_FOUND))
}

pub async fn search_persons(
    State(state): State<Arc<AppState>>,
    WithRejection(Query(params), _): Params<SearchParams>,
) -> AppResult<Json<Vec<Person>>> {
    let page = params.page_params().validate(MIN_PAGE).map_err(AppError::Validation)?;
    state
        .persons
        .search(&params.query, page)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(PERSONS_NOT_FOUND))
}

pub async fn person_films(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath,
    WithRejection(Query(params), _): Params<PageParams>,
) -> AppResult<Json<Vec<FilmShort>>> {
    let page = params.validate(MIN_PAGE).map_err(AppError::Validation)?;
    state
        .persons
        .films(id, page)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound(PERSON_FILMS_NOT_FOUND))
}

pub async fn person_details(
    State(state): State<Arc<AppState>>,
    WithRejection(Path(id), _): IdPath,
) -> AppResult<Json<Person>> {
    state.persons.get_by_id(id).await?.map(Json).ok_or(AppError::NotFound(PERSONS_NOT_FOUND))
}
