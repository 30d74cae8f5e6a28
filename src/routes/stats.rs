use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{error::AppResult, models::Film, state::AppState};

const DEFAULT_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
pub struct TopFavoritedQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TopFavoritedEntry {
    #[serde(flatten)]
    pub film: Film,
    pub favorite_count: u64,
}

#[derive(Debug, Serialize)]
pub struct GenreCount {
    pub genre: String,
    pub favorite_count: u64,
}

/// Handler for the most-favorited films
pub async fn top_favorited(
    State(state): State<AppState>,
    Query(params): Query<TopFavoritedQuery>,
) -> AppResult<Json<Vec<TopFavoritedEntry>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let ranked = state.stats.top_favorited(limit).await?;

    Ok(Json(
        ranked
            .into_iter()
            .map(|(film, favorite_count)| TopFavoritedEntry {
                film,
                favorite_count,
            })
            .collect(),
    ))
}

/// Handler for favorite counts per genre token
pub async fn favorites_by_genre(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<GenreCount>>> {
    let counts = state.stats.favorites_by_genre().await?;

    Ok(Json(
        counts
            .into_iter()
            .map(|(genre, favorite_count)| GenreCount {
                genre,
                favorite_count,
            })
            .collect(),
    ))
}
