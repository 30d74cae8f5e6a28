use std::collections::{BTreeMap, HashSet};

use tokio::sync::RwLock;

use crate::{
    error::{AppError, AppResult},
    models::{Film, NewUser, Role, User},
    store::{FavoriteStore, FilmStore, UserStore},
};

/// In-memory storage adapter.
///
/// Backs tests and database-less local runs. All three store traits are
/// implemented on the same struct so one instance can be shared across the
/// service layer. Favorite recency is tracked by insertion order, which is
/// what `created_at` ordering gives the relational backend.
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    next_user_id: i64,
    films: BTreeMap<i64, Film>,
    /// (user_id, film_id) edges in insertion order.
    favorites: Vec<(i64, i64)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                next_user_id: 1,
                ..Inner::default()
            }),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut inner = self.inner.write().await;

        // Mirrors the unique index on LOWER(pseudo) in the relational backend.
        let taken = inner
            .users
            .values()
            .any(|u| u.pseudo.to_lowercase() == new_user.pseudo.to_lowercase());
        if taken {
            return Err(AppError::DuplicatePseudo(new_user.pseudo));
        }

        let id = inner.next_user_id;
        inner.next_user_id += 1;
        let user = User {
            id,
            pseudo: new_user.pseudo,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
        };
        inner.users.insert(id, user.clone());
        Ok(user)
    }

    async fn find_by_pseudo(&self, pseudo: &str) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        let needle = pseudo.to_lowercase();
        Ok(inner
            .users
            .values()
            .find(|u| u.pseudo.to_lowercase() == needle)
            .cloned())
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let inner = self.inner.read().await;
        Ok(inner.users.get(&id).cloned())
    }

    async fn update_role(&self, id: i64, role: Role) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.users.get_mut(&id) {
            Some(user) => {
                user.role = role;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        let mut inner = self.inner.write().await;
        let removed = inner.users.remove(&id).is_some();
        if removed {
            inner.favorites.retain(|(user_id, _)| *user_id != id);
        }
        Ok(removed)
    }
}

#[async_trait::async_trait]
impl FilmStore for MemoryStore {
    async fn upsert(&self, film: Film) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner.films.insert(film.id, film);
        Ok(())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Film>> {
        let inner = self.inner.read().await;
        Ok(inner.films.get(&id).cloned())
    }

    async fn find_by_title(&self, title: &str, year: Option<i32>) -> AppResult<Option<Film>> {
        let inner = self.inner.read().await;
        let needle = title.to_lowercase();
        Ok(inner
            .films
            .values()
            .find(|f| {
                f.title.to_lowercase() == needle && (year.is_none() || f.year == year)
            })
            .cloned())
    }

    async fn search(
        &self,
        title: Option<String>,
        genre: Option<String>,
        limit: usize,
    ) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        let title = title.map(|t| t.to_lowercase());
        let genre = genre.map(|g| g.to_lowercase());
        Ok(inner
            .films
            .values()
            .filter(|f| {
                title
                    .as_deref()
                    .map_or(true, |t| f.title.to_lowercase().contains(t))
                    && genre
                        .as_deref()
                        .map_or(true, |g| f.genre.to_lowercase().contains(g))
            })
            .take(limit)
            .cloned()
            .collect())
    }

    async fn all(&self) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        Ok(inner.films.values().cloned().collect())
    }
}

#[async_trait::async_trait]
impl FavoriteStore for MemoryStore {
    async fn add(&self, user_id: i64, film_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        let exists = inner
            .favorites
            .iter()
            .any(|&(u, f)| u == user_id && f == film_id);
        if !exists {
            inner.favorites.push((user_id, film_id));
        }
        Ok(())
    }

    async fn remove(&self, user_id: i64, film_id: i64) -> AppResult<()> {
        let mut inner = self.inner.write().await;
        inner
            .favorites
            .retain(|&(u, f)| !(u == user_id && f == film_id));
        Ok(())
    }

    async fn films_for_user(&self, user_id: i64) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        Ok(inner
            .favorites
            .iter()
            .rev()
            .filter(|&&(u, _)| u == user_id)
            .filter_map(|&(_, film_id)| inner.films.get(&film_id).cloned())
            .collect())
    }

    async fn film_ids_for_user(&self, user_id: i64) -> AppResult<HashSet<i64>> {
        let inner = self.inner.read().await;
        Ok(inner
            .favorites
            .iter()
            .filter(|&&(u, _)| u == user_id)
            .map(|&(_, film_id)| film_id)
            .collect())
    }

    async fn favorited_films(&self) -> AppResult<Vec<Film>> {
        let inner = self.inner.read().await;
        Ok(inner
            .favorites
            .iter()
            .filter_map(|&(_, film_id)| inner.films.get(&film_id).cloned())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(id: i64, title: &str) -> Film {
        Film {
            id,
            title: title.to_string(),
            year: Some(2000),
            director: None,
            genre: "Drama".to_string(),
            cast: vec![],
        }
    }

    fn new_user(pseudo: &str) -> NewUser {
        NewUser {
            pseudo: pseudo.to_string(),
            email: None,
            password_hash: "hash".to_string(),
            role: Role::Client,
        }
    }

    #[tokio::test]
    async fn test_user_ids_are_sequential() {
        let store = MemoryStore::new();
        let alice = store.create(new_user("alice")).await.unwrap();
        let bob = store.create(new_user("bob")).await.unwrap();
        assert_eq!(alice.id, 1);
        assert_eq!(bob.id, 2);
    }

    #[tokio::test]
    async fn test_pseudo_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        store.create(new_user("Alice")).await.unwrap();
        let found = store.find_by_pseudo("aLiCe").await.unwrap();
        assert_eq!(found.unwrap().pseudo, "Alice");
    }

    #[tokio::test]
    async fn test_duplicate_pseudo_rejected_any_casing() {
        let store = MemoryStore::new();
        store.create(new_user("Bob")).await.unwrap();
        let err = store.create(new_user("bob")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicatePseudo(_)));
    }

    #[tokio::test]
    async fn test_delete_user_cascades_favorites() {
        let store = MemoryStore::new();
        let user = store.create(new_user("carol")).await.unwrap();
        FilmStore::upsert(&store, film(10, "Heat")).await.unwrap();
        FavoriteStore::add(&store, user.id, 10).await.unwrap();

        assert!(UserStore::delete(&store, user.id).await.unwrap());
        assert!(store.favorited_films().await.unwrap().is_empty());
        // Second delete is reported as not found.
        assert!(!UserStore::delete(&store, user.id).await.unwrap());
    }

    #[tokio::test]
    async fn test_find_by_title_year_disambiguation() {
        let store = MemoryStore::new();
        let mut remake = film(2, "Nosferatu");
        remake.year = Some(2024);
        let mut original = film(1, "Nosferatu");
        original.year = Some(1922);
        FilmStore::upsert(&store, original).await.unwrap();
        FilmStore::upsert(&store, remake).await.unwrap();

        let first = store.find_by_title("nosferatu", None).await.unwrap();
        assert_eq!(first.unwrap().id, 1);
        let by_year = store.find_by_title("NOSFERATU", Some(2024)).await.unwrap();
        assert_eq!(by_year.unwrap().id, 2);
        let missing = store.find_by_title("Nosferatu", Some(1979)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_favorites_order_most_recent_first() {
        let store = MemoryStore::new();
        let user = store.create(new_user("dave")).await.unwrap();
        for (id, title) in [(1, "First"), (2, "Second"), (3, "Third")] {
            FilmStore::upsert(&store, film(id, title)).await.unwrap();
            FavoriteStore::add(&store, user.id, id).await.unwrap();
        }

        let films = store.films_for_user(user.id).await.unwrap();
        let ids: Vec<i64> = films.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 2, 1]);
    }

    #[tokio::test]
    async fn test_add_favorite_is_idempotent() {
        let store = MemoryStore::new();
        let user = store.create(new_user("erin")).await.unwrap();
        FilmStore::upsert(&store, film(1, "Heat")).await.unwrap();

        FavoriteStore::add(&store, user.id, 1).await.unwrap();
        FavoriteStore::add(&store, user.id, 1).await.unwrap();
        assert_eq!(store.films_for_user(user.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_remove_missing_favorite_is_noop() {
        let store = MemoryStore::new();
        let user = store.create(new_user("frank")).await.unwrap();
        FilmStore::upsert(&store, film(1, "Heat")).await.unwrap();
        FavoriteStore::remove(&store, user.id, 1).await.unwrap();
        assert!(store.films_for_user(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_filters_title_and_genre() {
        let store = MemoryStore::new();
        let mut action = film(1, "Mad Max");
        action.genre = "Action, Adventure".to_string();
        FilmStore::upsert(&store, action).await.unwrap();
        FilmStore::upsert(&store, film(2, "Madame Bovary")).await.unwrap();

        let by_title = store.search(Some("mad".to_string()), None, 10).await.unwrap();
        assert_eq!(by_title.len(), 2);
        let by_both = store
            .search(Some("mad".to_string()), Some("action".to_string()), 10)
            .await
            .unwrap();
        assert_eq!(by_both.len(), 1);
        assert_eq!(by_both[0].id, 1);
    }

    #[tokio::test]
    async fn test_all_is_in_catalogue_order() {
        let store = MemoryStore::new();
        FilmStore::upsert(&store, film(30, "C")).await.unwrap();
        FilmStore::upsert(&store, film(10, "A")).await.unwrap();
        FilmStore::upsert(&store, film(20, "B")).await.unwrap();
        let ids: Vec<i64> = store.all().await.unwrap().iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![10, 20, 30]);
    }
}
