use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{Film, FilmRef},
    services::recommendations::DEFAULT_TOP_K,
    state::AppState,
};

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct SubstringQuery {
    pub q: String,
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
pub struct SimilarQuery {
    pub film_id: Option<i64>,
    pub title: Option<String>,
    pub top_k: Option<usize>,
}

/// Handler for title-substring recommendations
pub async fn by_title(
    State(state): State<AppState>,
    Query(params): Query<SubstringQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let films = state.recommendations.by_title(&params.q, limit).await?;
    Ok(Json(films))
}

/// Handler for genre-substring recommendations
pub async fn by_genre(
    State(state): State<AppState>,
    Query(params): Query<SubstringQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let films = state.recommendations.by_genre(&params.q, limit).await?;
    Ok(Json(films))
}

/// Handler for scored similarity against a reference film given by id
/// or title.
pub async fn similar(
    State(state): State<AppState>,
    Query(params): Query<SimilarQuery>,
) -> AppResult<Json<Vec<Film>>> {
    let reference = match (params.film_id, params.title) {
        (Some(id), _) => FilmRef::Id(id),
        (None, Some(title)) => FilmRef::Title(title),
        (None, None) => {
            return Err(AppError::InvalidInput(
                "either film_id or title is required".to_string(),
            ))
        }
    };

    let top_k = params.top_k.unwrap_or(DEFAULT_TOP_K);
    let films = state.recommendations.similar(&reference, top_k).await?;
    Ok(Json(films))
}
