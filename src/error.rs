use axum::{
    Json,
    extract::rejection::{PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::store::StoreError;

pub const FILMS_NOT_FOUND: &str = "Film(s) not found";
pub const GENRES_NOT_FOUND: &str = "Genre(s) not found";
pub const PERSONS_NOT_FOUND: &str = "Person(s) not found";
pub const PERSON_FILMS_NOT_FOUND: &str = "Films for person not found";

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("catalog backend unavailable: {0}")]
    Unavailable(#[from] StoreError),
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        Self::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::NotFound(msg) => (StatusCode::NOT_FOUND, msg.to_string()),
            Self::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            Self::Unavailable(err) => {
                tracing::error!(error = %err, "catalog request failed");
                (StatusCode::SERVICE_UNAVAILABLE, "Catalog backend unavailable".to_string())
            }
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
