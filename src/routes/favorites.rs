use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::Film,
    routes::extract::AuthUser,
    state::AppState,
};

/// A film designated either by canonical id or by human-entered title,
/// optionally disambiguated by year.
#[derive(Debug, Deserialize)]
pub struct FavoriteTarget {
    pub film_id: Option<i64>,
    pub title: Option<String>,
    pub year: Option<i32>,
}

impl FavoriteTarget {
    async fn resolve(&self, state: &AppState) -> AppResult<i64> {
        if let Some(film_id) = self.film_id {
            return Ok(film_id);
        }
        if let Some(title) = &self.title {
            let film = state.favorites.resolve_film(title, self.year).await?;
            return Ok(film.id);
        }
        Err(AppError::InvalidInput(
            "either film_id or title is required".to_string(),
        ))
    }
}

/// Handler for listing the caller's favorites, most recently added first.
pub async fn list(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> AppResult<Json<Vec<Film>>> {
    let films = state.favorites.list(identity.id).await?;
    Ok(Json(films))
}

/// Handler for adding a favorite. Idempotent.
pub async fn add(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(target): Json<FavoriteTarget>,
) -> AppResult<StatusCode> {
    let film_id = target.resolve(&state).await?;
    state.favorites.add(identity.id, film_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for removing a favorite. Idempotent.
pub async fn remove(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(target): Json<FavoriteTarget>,
) -> AppResult<StatusCode> {
    let film_id = target.resolve(&state).await?;
    state.favorites.remove(identity.id, film_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
