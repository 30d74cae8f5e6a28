//! Storage collaborator interface.
//!
//! The service layer depends only on these traits; backends are injected at
//! construction time (no process-wide connection singleton). Two adapters
//! exist: [`postgres::PgStore`] for production and [`memory::MemoryStore`]
//! for tests and database-less local runs.

use std::collections::HashSet;

use crate::{
    error::AppResult,
    models::{Film, NewUser, Role, User},
};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Persistence for user records. Pseudo lookups are case-insensitive.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Persists a new user and returns the stored record with its id.
    async fn create(&self, new_user: NewUser) -> AppResult<User>;

    async fn find_by_pseudo(&self, pseudo: &str) -> AppResult<Option<User>>;

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>>;

    /// Returns false when no user has the given id.
    async fn update_role(&self, id: i64, role: Role) -> AppResult<bool>;

    /// Deletes a user and (by cascade) their favorites. Returns false when
    /// no user has the given id.
    async fn delete(&self, id: i64) -> AppResult<bool>;
}

/// Persistence for the film catalogue.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FilmStore: Send + Sync {
    /// Inserts or replaces a film by canonical id, cast included.
    async fn upsert(&self, film: Film) -> AppResult<()>;

    async fn get(&self, id: i64) -> AppResult<Option<Film>>;

    /// First film whose title matches case-insensitively, optionally
    /// disambiguated by release year.
    async fn find_by_title(&self, title: &str, year: Option<i32>) -> AppResult<Option<Film>>;

    /// Substring search over title and/or genre, in catalogue order.
    async fn search(
        &self,
        title: Option<String>,
        genre: Option<String>,
        limit: usize,
    ) -> AppResult<Vec<Film>>;

    /// The whole catalogue in catalogue order (ascending id).
    async fn all(&self) -> AppResult<Vec<Film>>;
}

/// Persistence for the user-to-film favorite relation.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait FavoriteStore: Send + Sync {
    /// Idempotent: adding an existing edge is a no-op.
    async fn add(&self, user_id: i64, film_id: i64) -> AppResult<()>;

    /// Idempotent: removing a missing edge is a no-op.
    async fn remove(&self, user_id: i64, film_id: i64) -> AppResult<()>;

    /// Films favorited by the user, most recently added first.
    async fn films_for_user(&self, user_id: i64) -> AppResult<Vec<Film>>;

    async fn film_ids_for_user(&self, user_id: i64) -> AppResult<HashSet<i64>>;

    /// One film per favorite edge, across all users. A film favorited by
    /// three users appears three times; this single join query feeds the
    /// stats aggregator without per-row lookups.
    async fn favorited_films(&self) -> AppResult<Vec<Film>>;
}
