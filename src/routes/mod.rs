use axum::{
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    middleware::{make_span_with_request_id, request_id_middleware},
    state::AppState,
};

pub mod admin;
pub mod auth;
pub mod extract;
pub mod favorites;
pub mod films;
pub mod recommendations;
pub mod stats;

/// Creates the application router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(CorsLayer::permissive())
                .layer(axum::middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id)),
        )
        .with_state(state)
}

/// API routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        // Authentication
        .route("/auth/signup", post(auth::signup))
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        // Catalogue
        .route("/films", get(films::list))
        // Favorites
        .route("/favorites", get(favorites::list))
        .route("/favorites", post(favorites::add))
        .route("/favorites", delete(favorites::remove))
        // Recommendations
        .route("/recommendations/by_title", get(recommendations::by_title))
        .route("/recommendations/by_genre", get(recommendations::by_genre))
        .route("/recommendations/similar", get(recommendations::similar))
        // Stats
        .route("/stats/top_favorited", get(stats::top_favorited))
        .route("/stats/favorites_by_genre", get(stats::favorites_by_genre))
        // Admin
        .route("/admin/import", post(admin::import_film))
        .route("/admin/users/:id/promote", post(admin::promote_user))
        .route("/admin/users/:id", delete(admin::delete_user))
}

/// Health check endpoint
async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}
