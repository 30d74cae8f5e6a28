use std::collections::HashMap;
use std::sync::Arc;

use crate::{error::AppResult, models::Film, store::FavoriteStore};

/// Simple counting aggregations over the favorites relation.
///
/// Both aggregations consume the single favorites-join query from the
/// store (one film per favorite edge) and count in memory.
pub struct StatsService {
    favorites: Arc<dyn FavoriteStore>,
}

impl StatsService {
    pub fn new(favorites: Arc<dyn FavoriteStore>) -> Self {
        Self { favorites }
    }

    /// Most-favorited films with their favorite counts, count descending,
    /// ties broken by ascending film id.
    pub async fn top_favorited(&self, limit: usize) -> AppResult<Vec<(Film, u64)>> {
        let edges = self.favorites.favorited_films().await?;

        let mut counts: HashMap<i64, (Film, u64)> = HashMap::new();
        for film in edges {
            counts
                .entry(film.id)
                .or_insert_with(|| (film, 0))
                .1 += 1;
        }

        let mut ranked: Vec<(Film, u64)> = counts.into_values().collect();
        ranked.sort_by(|(film_a, count_a), (film_b, count_b)| {
            count_b.cmp(count_a).then(film_a.id.cmp(&film_b.id))
        });
        ranked.truncate(limit);
        Ok(ranked)
    }

    /// Total favorites per genre token, count descending, ties broken by
    /// genre name.
    ///
    /// Each favorite edge contributes one count to every genre token of its
    /// film: a favorite on "Action, Drama" counts once for Action and once
    /// for Drama. Multi-genre films double-count by design; these are
    /// approximate stats over unstructured genre text.
    pub async fn favorites_by_genre(&self) -> AppResult<Vec<(String, u64)>> {
        let edges = self.favorites.favorited_films().await?;

        let mut counts: HashMap<String, u64> = HashMap::new();
        for film in edges {
            for genre in film.genre_tokens() {
                *counts.entry(genre).or_insert(0) += 1;
            }
        }

        let mut ranked: Vec<(String, u64)> = counts.into_iter().collect();
        ranked.sort_by(|(genre_a, count_a), (genre_b, count_b)| {
            count_b.cmp(count_a).then(genre_a.cmp(genre_b))
        });
        Ok(ranked)
    }
}
