use std::sync::Arc;

use sqlx::PgPool;

use crate::{
    config::Config,
    services::{
        password::PasswordPolicy, AuthService, CatalogueImporter, FavoritesService,
        RecommendationService, SessionManager, StatsService, TmdbClient,
    },
    store::{FavoriteStore, FilmStore, MemoryStore, PgStore, UserStore},
};

/// Shared application state: the storage collaborators and the services
/// built over them, assembled once at startup and cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserStore>,
    pub films: Arc<dyn FilmStore>,
    pub auth: Arc<AuthService>,
    pub favorites: Arc<FavoritesService>,
    pub recommendations: Arc<RecommendationService>,
    pub stats: Arc<StatsService>,
    pub sessions: SessionManager,
    /// Catalogue import is optional: absent when no TMDB key is configured.
    pub importer: Option<Arc<CatalogueImporter>>,
}

impl AppState {
    /// Wires services over explicit store collaborators.
    pub fn new(
        users: Arc<dyn UserStore>,
        films: Arc<dyn FilmStore>,
        favorites: Arc<dyn FavoriteStore>,
        config: &Config,
    ) -> Self {
        let policy = PasswordPolicy::new(config.password_min_length);
        let importer = config.tmdb_api_key.as_ref().map(|key| {
            let client = TmdbClient::new(key.clone(), config.tmdb_api_url.clone());
            Arc::new(CatalogueImporter::new(client, films.clone()))
        });

        Self {
            users: users.clone(),
            films: films.clone(),
            auth: Arc::new(AuthService::new(users, policy)),
            favorites: Arc::new(FavoritesService::new(films.clone(), favorites.clone())),
            recommendations: Arc::new(RecommendationService::new(films)),
            stats: Arc::new(StatsService::new(favorites)),
            sessions: SessionManager::with_ttl_secs(config.session_ttl_secs),
            importer,
        }
    }

    /// State over the PostgreSQL adapter.
    pub fn with_postgres(pool: PgPool, config: &Config) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store.clone(), store, config)
    }

    /// State over the in-memory adapter, for tests and database-less runs.
    pub fn in_memory(config: &Config) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self::new(store.clone(), store.clone(), store, config)
    }
}
