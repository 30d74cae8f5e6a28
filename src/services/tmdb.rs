//! TMDB catalogue import collaborator.
//!
//! Fetches a canonical film record (id, title, year, director, ordered
//! cast, genre list) for a search query. The rest of the crate treats the
//! result as an opaque [`Film`]; TMDB specifics stay in this module.

use std::sync::Arc;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::Film,
    store::FilmStore,
};

/// Billing-order cast entries kept per film on import.
const CAST_LIMIT: usize = 10;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: i64,
}

#[derive(Debug, Deserialize)]
struct MovieDetails {
    id: i64,
    title: String,
    #[serde(default)]
    release_date: Option<String>,
    #[serde(default)]
    genres: Vec<Genre>,
    #[serde(default)]
    credits: Option<Credits>,
}

#[derive(Debug, Deserialize)]
struct Genre {
    name: String,
}

#[derive(Debug, Deserialize, Default)]
struct Credits {
    #[serde(default)]
    cast: Vec<CastMember>,
    #[serde(default)]
    crew: Vec<CrewMember>,
}

#[derive(Debug, Deserialize)]
struct CastMember {
    name: String,
    #[serde(default)]
    order: i32,
}

#[derive(Debug, Deserialize)]
struct CrewMember {
    name: String,
    job: String,
}

impl MovieDetails {
    fn into_film(self) -> Film {
        // "1995-12-15" -> 1995; missing or malformed dates become None.
        let year = self
            .release_date
            .as_deref()
            .and_then(|d| d.get(..4))
            .and_then(|y| y.parse::<i32>().ok());

        let credits = self.credits.unwrap_or_default();

        let director = credits
            .crew
            .iter()
            .find(|c| c.job == "Director")
            .map(|c| c.name.clone());

        let mut cast = credits.cast;
        cast.sort_by_key(|c| c.order);
        let cast = cast
            .into_iter()
            .take(CAST_LIMIT)
            .map(|c| c.name)
            .collect();

        let genre = self
            .genres
            .into_iter()
            .map(|g| g.name)
            .collect::<Vec<_>>()
            .join(", ");

        Film {
            id: self.id,
            title: self.title,
            year,
            director,
            genre,
            cast,
        }
    }
}

pub struct TmdbClient {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbClient {
    pub fn new(api_key: String, api_url: String) -> Self {
        Self {
            http_client: HttpClient::new(),
            api_key,
            api_url,
        }
    }

    /// Resolves a search query to the canonical record of its best match.
    pub async fn search_movie(&self, query: &str) -> AppResult<Film> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "search query cannot be empty".to_string(),
            ));
        }

        let url = format!("{}/search/movie", self.api_url);
        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str()), ("query", query)])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB search returned status {}: {}",
                status, body
            )));
        }

        let search: SearchResponse = response.json().await?;
        let hit = search.results.first().ok_or_else(|| {
            AppError::ExternalApi(format!("TMDB returned no results for '{}'", query))
        })?;

        self.movie_details(hit.id).await
    }

    /// Fetches full details (credits included) for a TMDB movie id.
    pub async fn movie_details(&self, movie_id: i64) -> AppResult<Film> {
        let url = format!("{}/movie/{}", self.api_url, movie_id);
        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("api_key", self.api_key.as_str()),
                ("append_to_response", "credits"),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::ExternalApi(format!(
                "TMDB details returned status {}: {}",
                status, body
            )));
        }

        let details: MovieDetails = response.json().await?;
        Ok(details.into_film())
    }
}

/// Imports TMDB records into the film catalogue.
pub struct CatalogueImporter {
    tmdb: TmdbClient,
    films: Arc<dyn FilmStore>,
}

impl CatalogueImporter {
    pub fn new(tmdb: TmdbClient, films: Arc<dyn FilmStore>) -> Self {
        Self { tmdb, films }
    }

    /// Fetches the best match for a query and upserts it by canonical id.
    pub async fn import(&self, query: &str) -> AppResult<Film> {
        let film = self.tmdb.search_movie(query).await?;
        self.films.upsert(film.clone()).await?;

        tracing::info!(
            film_id = film.id,
            title = %film.title,
            "film imported into catalogue"
        );

        Ok(film)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_movie_details_into_film() {
        let json = r#"{
            "id": 949,
            "title": "Heat",
            "release_date": "1995-12-15",
            "genres": [{"id": 28, "name": "Action"}, {"id": 80, "name": "Crime"}],
            "credits": {
                "cast": [
                    {"name": "Robert De Niro", "order": 1},
                    {"name": "Al Pacino", "order": 0}
                ],
                "crew": [
                    {"name": "Dante Spinotti", "job": "Director of Photography"},
                    {"name": "Michael Mann", "job": "Director"}
                ]
            }
        }"#;

        let details: MovieDetails = serde_json::from_str(json).unwrap();
        let film = details.into_film();

        assert_eq!(film.id, 949);
        assert_eq!(film.title, "Heat");
        assert_eq!(film.year, Some(1995));
        assert_eq!(film.director, Some("Michael Mann".to_string()));
        assert_eq!(film.genre, "Action, Crime");
        // Cast ordered by billing, not response order.
        assert_eq!(film.cast, vec!["Al Pacino", "Robert De Niro"]);
    }

    #[test]
    fn test_movie_details_tolerates_missing_fields() {
        let json = r#"{"id": 7, "title": "Obscure"}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        let film = details.into_film();

        assert_eq!(film.year, None);
        assert_eq!(film.director, None);
        assert!(film.cast.is_empty());
        assert_eq!(film.genre, "");
    }

    #[test]
    fn test_malformed_release_date_yields_no_year() {
        let json = r#"{"id": 7, "title": "Odd", "release_date": "soon"}"#;
        let details: MovieDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.into_film().year, None);
    }

    #[test]
    fn test_cast_truncated_to_limit() {
        let cast: Vec<String> = (0..20)
            .map(|i| format!(r#"{{"name": "Actor {}", "order": {}}}"#, i, i))
            .collect();
        let json = format!(
            r#"{{"id": 7, "title": "Crowded", "credits": {{"cast": [{}], "crew": []}}}}"#,
            cast.join(",")
        );

        let details: MovieDetails = serde_json::from_str(&json).unwrap();
        let film = details.into_film();
        assert_eq!(film.cast.len(), CAST_LIMIT);
        assert_eq!(film.cast[0], "Actor 0");
    }
}
