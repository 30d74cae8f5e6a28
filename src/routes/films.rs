use std::collections::HashSet;

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::Film,
    routes::extract::MaybeAuthUser,
    state::AppState,
};

const DEFAULT_LIMIT: usize = 100;

#[derive(Debug, Deserialize)]
pub struct FilmsQuery {
    pub title: Option<String>,
    pub genre: Option<String>,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FilmResponse {
    #[serde(flatten)]
    pub film: Film,
    /// Present only for authenticated callers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub favorite: Option<bool>,
}

/// Builds film responses, flagging favorites when the caller is logged in.
pub fn with_favorite_flags(films: Vec<Film>, favorite_ids: Option<&HashSet<i64>>) -> Vec<FilmResponse> {
    films
        .into_iter()
        .map(|film| FilmResponse {
            favorite: favorite_ids.map(|ids| ids.contains(&film.id)),
            film,
        })
        .collect()
}

/// Handler for catalogue search: optional title and genre substring
/// filters, catalogue order.
pub async fn list(
    State(state): State<AppState>,
    MaybeAuthUser(identity): MaybeAuthUser,
    Query(params): Query<FilmsQuery>,
) -> AppResult<Json<Vec<FilmResponse>>> {
    let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
    let films = state
        .films
        .search(params.title, params.genre, limit)
        .await?;

    let favorite_ids = match identity {
        Some(identity) => Some(state.favorites.favorite_film_ids(identity.id).await?),
        None => None,
    };

    Ok(Json(with_favorite_flags(films, favorite_ids.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(id: i64) -> Film {
        Film {
            id,
            title: format!("Film {}", id),
            year: None,
            director: None,
            genre: String::new(),
            cast: vec![],
        }
    }

    #[test]
    fn test_flags_omitted_for_anonymous() {
        let responses = with_favorite_flags(vec![film(1)], None);
        assert_eq!(responses[0].favorite, None);
        let json = serde_json::to_value(&responses[0]).unwrap();
        assert!(json.get("favorite").is_none());
    }

    #[test]
    fn test_flags_set_from_id_set() {
        let ids: HashSet<i64> = [2].into_iter().collect();
        let responses = with_favorite_flags(vec![film(1), film(2)], Some(&ids));
        assert_eq!(responses[0].favorite, Some(false));
        assert_eq!(responses[1].favorite, Some(true));
    }
}
