use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Film, NewUser, Role, User},
    store::{FavoriteStore, FilmStore, UserStore},
};

/// PostgreSQL storage adapter.
///
/// Queries are runtime-checked (`sqlx::query_as`) so the crate builds
/// without a live database. Multi-statement writes run in a transaction;
/// every read that needs cast lists batches them in a single query keyed on
/// film ids rather than one lookup per row.
pub struct PgStore {
    pool: PgPool,
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: i64,
    pseudo: String,
    email: Option<String>,
    password_hash: String,
    role: String,
}

impl UserRow {
    fn into_user(self) -> AppResult<User> {
        let role = Role::from_str(&self.role)
            .map_err(|e| AppError::Internal(format!("corrupt user record: {}", e)))?;
        Ok(User {
            id: self.id,
            pseudo: self.pseudo,
            email: self.email,
            password_hash: self.password_hash,
            role,
        })
    }
}

#[derive(sqlx::FromRow)]
struct FilmRow {
    id: i64,
    title: String,
    year: Option<i32>,
    director: Option<String>,
    genre: String,
}

impl FilmRow {
    fn into_film(self, cast: Vec<String>) -> Film {
        Film {
            id: self.id,
            title: self.title,
            year: self.year,
            director: self.director,
            genre: self.genre,
            cast,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Loads cast lists for a set of films in one query and attaches them.
    async fn attach_casts(&self, rows: Vec<FilmRow>) -> AppResult<Vec<Film>> {
        if rows.is_empty() {
            return Ok(vec![]);
        }

        let mut ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        ids.sort_unstable();
        ids.dedup();

        let cast_rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT c.film_id, a.name
            FROM casting c
            JOIN actor a ON a.id = c.actor_id
            WHERE c.film_id = ANY($1)
            ORDER BY c.film_id, c.position
            "#,
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut casts: HashMap<i64, Vec<String>> = HashMap::new();
        for (film_id, name) in cast_rows {
            casts.entry(film_id).or_default().push(name);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let cast = casts.get(&row.id).cloned().unwrap_or_default();
                row.into_film(cast)
            })
            .collect())
    }
}

#[async_trait::async_trait]
impl UserStore for PgStore {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let result: Result<(i64,), sqlx::Error> = sqlx::query_as(
            r#"
            INSERT INTO users (pseudo, email, password_hash, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&new_user.pseudo)
        .bind(&new_user.email)
        .bind(&new_user.password_hash)
        .bind(new_user.role.as_str())
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok((id,)) => Ok(User {
                id,
                pseudo: new_user.pseudo,
                email: new_user.email,
                password_hash: new_user.password_hash,
                role: new_user.role,
            }),
            // The unique index on LOWER(pseudo) is the backstop for
            // concurrent signups racing past the service-level check.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::DuplicatePseudo(new_user.pseudo))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_pseudo(&self, pseudo: &str) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, pseudo, email, password_hash, role
            FROM users
            WHERE LOWER(pseudo) = LOWER($1)
            LIMIT 1
            "#,
        )
        .bind(pseudo)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn find_by_id(&self, id: i64) -> AppResult<Option<User>> {
        let row: Option<UserRow> = sqlx::query_as(
            r#"
            SELECT id, pseudo, email, password_hash, role
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(UserRow::into_user).transpose()
    }

    async fn update_role(&self, id: i64, role: Role) -> AppResult<bool> {
        let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
            .bind(id)
            .bind(role.as_str())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: i64) -> AppResult<bool> {
        // Favorites go with the user via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait::async_trait]
impl FilmStore for PgStore {
    async fn upsert(&self, film: Film) -> AppResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO film (id, title, year, director, genre)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (id) DO UPDATE SET
                title = EXCLUDED.title,
                year = EXCLUDED.year,
                director = EXCLUDED.director,
                genre = EXCLUDED.genre
            "#,
        )
        .bind(film.id)
        .bind(&film.title)
        .bind(film.year)
        .bind(&film.director)
        .bind(&film.genre)
        .execute(&mut *tx)
        .await?;

        // Reimports replace the cast list wholesale, preserving billing order.
        sqlx::query("DELETE FROM casting WHERE film_id = $1")
            .bind(film.id)
            .execute(&mut *tx)
            .await?;

        for (position, name) in film.cast.iter().enumerate() {
            let (actor_id,): (i64,) = sqlx::query_as(
                r#"
                INSERT INTO actor (name) VALUES ($1)
                ON CONFLICT (name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(name)
            .fetch_one(&mut *tx)
            .await?;

            sqlx::query(
                "INSERT INTO casting (film_id, actor_id, position) VALUES ($1, $2, $3)",
            )
            .bind(film.id)
            .bind(actor_id)
            .bind(position as i32)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get(&self, id: i64) -> AppResult<Option<Film>> {
        let row: Option<FilmRow> = sqlx::query_as(
            "SELECT id, title, year, director, genre FROM film WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_casts(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_title(&self, title: &str, year: Option<i32>) -> AppResult<Option<Film>> {
        let row: Option<FilmRow> = sqlx::query_as(
            r#"
            SELECT id, title, year, director, genre
            FROM film
            WHERE LOWER(title) = LOWER($1)
              AND ($2::int IS NULL OR year = $2)
            ORDER BY id
            LIMIT 1
            "#,
        )
        .bind(title)
        .bind(year)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => Ok(self.attach_casts(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn search(
        &self,
        title: Option<String>,
        genre: Option<String>,
        limit: usize,
    ) -> AppResult<Vec<Film>> {
        let rows: Vec<FilmRow> = sqlx::query_as(
            r#"
            SELECT id, title, year, director, genre
            FROM film
            WHERE ($1::text IS NULL OR title ILIKE '%' || $1 || '%')
              AND ($2::text IS NULL OR genre ILIKE '%' || $2 || '%')
            ORDER BY id
            LIMIT $3
            "#,
        )
        .bind(title)
        .bind(genre)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        self.attach_casts(rows).await
    }

    async fn all(&self) -> AppResult<Vec<Film>> {
        let rows: Vec<FilmRow> =
            sqlx::query_as("SELECT id, title, year, director, genre FROM film ORDER BY id")
                .fetch_all(&self.pool)
                .await?;

        self.attach_casts(rows).await
    }
}

#[async_trait::async_trait]
impl FavoriteStore for PgStore {
    async fn add(&self, user_id: i64, film_id: i64) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO favorites (user_id, film_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, film_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(film_id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn remove(&self, user_id: i64, film_id: i64) -> AppResult<()> {
        sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND film_id = $2")
            .bind(user_id)
            .bind(film_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn films_for_user(&self, user_id: i64) -> AppResult<Vec<Film>> {
        let rows: Vec<FilmRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.title, f.year, f.director, f.genre
            FROM favorites fav
            JOIN film f ON f.id = fav.film_id
            WHERE fav.user_id = $1
            ORDER BY fav.created_at DESC, f.id
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        self.attach_casts(rows).await
    }

    async fn film_ids_for_user(&self, user_id: i64) -> AppResult<HashSet<i64>> {
        let rows: Vec<(i64,)> =
            sqlx::query_as("SELECT film_id FROM favorites WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    async fn favorited_films(&self) -> AppResult<Vec<Film>> {
        let rows: Vec<FilmRow> = sqlx::query_as(
            r#"
            SELECT f.id, f.title, f.year, f.director, f.genre
            FROM favorites fav
            JOIN film f ON f.id = fav.film_id
            ORDER BY f.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.attach_casts(rows).await
    }
}
