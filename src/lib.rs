pub mod assemble;
pub mod cache;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod keys;
pub mod models;
pub mod pagination;
pub mod query;
pub mod routes;
pub mod services;
pub mod store;

use std::sync::Arc;

use crate::{
    cache::CacheManager,
    config::Config,
    services::{FilmService, GenreService, PersonService},
    store::CatalogStore,
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub films: FilmService,
    pub genres: GenreService,
    pub persons: PersonService,
}

impl AppState {
    pub fn new(config: Arc<Config>, store: Arc<dyn CatalogStore>, cache: CacheManager) -> Self {
        Self {
            config,
            films: FilmService::new(cache.clone(), store.clone()),
            genres: GenreService::new(cache.clone(), store.clone()),
            persons: PersonService::new(cache, store),
        }
    }
}
