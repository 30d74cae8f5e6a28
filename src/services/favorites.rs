use std::collections::HashSet;
use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::Film,
    store::{FavoriteStore, FilmStore},
};

/// Per-user favorites over the catalogue.
///
/// Add and remove are idempotent. Both end points must exist: the film id
/// is checked here, the user id comes from an authenticated session.
pub struct FavoritesService {
    films: Arc<dyn FilmStore>,
    favorites: Arc<dyn FavoriteStore>,
}

impl FavoritesService {
    pub fn new(films: Arc<dyn FilmStore>, favorites: Arc<dyn FavoriteStore>) -> Self {
        Self { films, favorites }
    }

    async fn ensure_film(&self, film_id: i64) -> AppResult<()> {
        if self.films.get(film_id).await?.is_none() {
            return Err(AppError::FilmNotFound(format!("id {}", film_id)));
        }
        Ok(())
    }

    /// Marks a film as favorite. Adding an already-favorited film is a
    /// silent no-op.
    pub async fn add(&self, user_id: i64, film_id: i64) -> AppResult<()> {
        self.ensure_film(film_id).await?;
        self.favorites.add(user_id, film_id).await?;
        tracing::debug!(user_id, film_id, "favorite added");
        Ok(())
    }

    /// Unmarks a film. Removing a film that was never favorited is a
    /// silent no-op.
    pub async fn remove(&self, user_id: i64, film_id: i64) -> AppResult<()> {
        self.ensure_film(film_id).await?;
        self.favorites.remove(user_id, film_id).await?;
        tracing::debug!(user_id, film_id, "favorite removed");
        Ok(())
    }

    /// Films favorited by the user, most recently added first.
    pub async fn list(&self, user_id: i64) -> AppResult<Vec<Film>> {
        self.favorites.films_for_user(user_id).await
    }

    /// Favorited film ids as a set, for rendering "is favorited" flags
    /// without a lookup per film.
    pub async fn favorite_film_ids(&self, user_id: i64) -> AppResult<HashSet<i64>> {
        self.favorites.film_ids_for_user(user_id).await
    }

    /// Resolves a human-entered title to a film: first case-insensitive
    /// exact title match, optionally disambiguated by year.
    pub async fn resolve_film(&self, title: &str, year: Option<i32>) -> AppResult<Film> {
        self.films
            .find_by_title(title, year)
            .await?
            .ok_or_else(|| AppError::FilmNotFound(title.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn film(id: i64, title: &str) -> Film {
        Film {
            id,
            title: title.to_string(),
            year: Some(2010),
            director: None,
            genre: "Drama".to_string(),
            cast: vec![],
        }
    }

    async fn service_with_films(films: Vec<Film>) -> FavoritesService {
        let store = Arc::new(MemoryStore::new());
        for f in films {
            FilmStore::upsert(store.as_ref(), f).await.unwrap();
        }
        FavoritesService::new(store.clone(), store)
    }

    #[tokio::test]
    async fn test_double_add_leaves_one_edge() {
        let service = service_with_films(vec![film(1, "Inception")]).await;

        service.add(42, 1).await.unwrap();
        service.add(42, 1).await.unwrap();

        assert_eq!(service.list(42).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_nonexistent_edge_is_noop() {
        let service = service_with_films(vec![film(1, "Inception")]).await;
        service.remove(42, 1).await.unwrap();
        assert!(service.list(42).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_unknown_film_fails() {
        let service = service_with_films(vec![]).await;
        let err = service.add(42, 999).await.unwrap_err();
        assert!(matches!(err, AppError::FilmNotFound(_)));
    }

    #[tokio::test]
    async fn test_list_most_recent_first() {
        let service =
            service_with_films(vec![film(1, "First"), film(2, "Second"), film(3, "Third")]).await;

        service.add(42, 1).await.unwrap();
        service.add(42, 3).await.unwrap();
        service.add(42, 2).await.unwrap();

        let titles: Vec<String> = service
            .list(42)
            .await
            .unwrap()
            .into_iter()
            .map(|f| f.title)
            .collect();
        assert_eq!(titles, vec!["Second", "Third", "First"]);
    }

    #[tokio::test]
    async fn test_favorite_film_ids() {
        let service = service_with_films(vec![film(1, "A"), film(2, "B")]).await;
        service.add(42, 2).await.unwrap();

        let ids = service.favorite_film_ids(42).await.unwrap();
        assert!(ids.contains(&2));
        assert!(!ids.contains(&1));
    }

    #[tokio::test]
    async fn test_resolve_film_case_insensitive() {
        let service = service_with_films(vec![film(7, "The Matrix")]).await;
        let resolved = service.resolve_film("the matrix", None).await.unwrap();
        assert_eq!(resolved.id, 7);

        let err = service.resolve_film("unknown title", None).await.unwrap_err();
        assert!(matches!(err, AppError::FilmNotFound(_)));
    }
}
