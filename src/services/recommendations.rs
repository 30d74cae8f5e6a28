//! Recommendation heuristics over the film catalogue.
//!
//! Three independent read-only strategies, each a single O(N) scan over one
//! catalogue fetch: substring match on titles, substring match on the raw
//! genre field, and scored similarity against a reference film. There is no
//! recommendation state and no per-row follow-up query.

use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Film, FilmRef},
    store::FilmStore,
};

/// Default number of scored-similarity results.
pub const DEFAULT_TOP_K: usize = 5;

/// Points per genre token shared with the reference film.
const GENRE_POINTS: i32 = 2;
/// Points for the same (non-null) director.
const DIRECTOR_POINTS: i32 = 3;
/// Points when both release years are known and at most this far apart.
const YEAR_POINTS: i32 = 1;
const YEAR_WINDOW: i32 = 5;

pub struct RecommendationService {
    films: Arc<dyn FilmStore>,
}

impl RecommendationService {
    pub fn new(films: Arc<dyn FilmStore>) -> Self {
        Self { films }
    }

    /// Films whose title contains the query, case-insensitively, in
    /// catalogue order. A blank query yields no results.
    pub async fn by_title(&self, query: &str, limit: usize) -> AppResult<Vec<Film>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let films = self.films.all().await?;
        Ok(films
            .into_iter()
            .filter(|f| f.title.to_lowercase().contains(&query))
            .take(limit)
            .collect())
    }

    /// Films whose genre field contains the query, case-insensitively, in
    /// catalogue order.
    ///
    /// The genre field is unstructured delimited text, so this is substring
    /// containment, not token equality: "action" matches "Action, Drama"
    /// but also any longer word containing it. That weak matching is the
    /// documented behavior of this strategy.
    pub async fn by_genre(&self, query: &str, limit: usize) -> AppResult<Vec<Film>> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Ok(vec![]);
        }

        let films = self.films.all().await?;
        Ok(films
            .into_iter()
            .filter(|f| f.genre.to_lowercase().contains(&query))
            .take(limit)
            .collect())
    }

    /// Scored similarity against a reference film.
    ///
    /// Every other film in the catalogue is scored (the reference itself is
    /// always excluded), sorted by score descending with ascending film id
    /// as the deterministic tie-break, and the top `top_k` returned.
    pub async fn similar(&self, reference: &FilmRef, top_k: usize) -> AppResult<Vec<Film>> {
        let films = self.films.all().await?;

        let reference = match reference {
            FilmRef::Id(id) => films.iter().find(|f| f.id == *id),
            FilmRef::Title(title) => {
                let needle = title.to_lowercase();
                films.iter().find(|f| f.title.to_lowercase() == needle)
            }
        }
        .cloned()
        .ok_or_else(|| AppError::FilmNotFound(reference.to_string()))?;

        let reference_genres: HashSet<String> = reference
            .genre_tokens()
            .into_iter()
            .map(|g| g.to_lowercase())
            .collect();

        let mut scored: Vec<(i32, Film)> = films
            .into_iter()
            .filter(|f| f.id != reference.id)
            .map(|f| (similarity_score(&reference, &reference_genres, &f), f))
            .collect();

        scored.sort_by(|(score_a, film_a), (score_b, film_b)| {
            score_b.cmp(score_a).then(film_a.id.cmp(&film_b.id))
        });

        tracing::debug!(
            reference_id = reference.id,
            candidates = scored.len(),
            top_k,
            "similarity scan complete"
        );

        Ok(scored.into_iter().take(top_k).map(|(_, f)| f).collect())
    }
}

/// Similarity of a candidate to the reference film: +2 per shared genre
/// token, +3 for the same non-null director, +1 when both years are known
/// and within five years of each other.
fn similarity_score(reference: &Film, reference_genres: &HashSet<String>, candidate: &Film) -> i32 {
    let shared_genres = candidate
        .genre_tokens()
        .into_iter()
        .map(|g| g.to_lowercase())
        .collect::<HashSet<String>>()
        .intersection(reference_genres)
        .count() as i32;

    let mut score = GENRE_POINTS * shared_genres;

    if let (Some(a), Some(b)) = (&reference.director, &candidate.director) {
        if a == b {
            score += DIRECTOR_POINTS;
        }
    }

    if let (Some(a), Some(b)) = (reference.year, candidate.year) {
        if (a - b).abs() <= YEAR_WINDOW {
            score += YEAR_POINTS;
        }
    }

    score
}
