pub mod auth;
pub mod favorites;
pub mod password;
pub mod recommendations;
pub mod session;
pub mod stats;
pub mod tmdb;

pub use auth::AuthService;
pub use favorites::FavoritesService;
pub use recommendations::RecommendationService;
pub use session::SessionManager;
pub use stats::StatsService;
pub use tmdb::{CatalogueImporter, TmdbClient};
