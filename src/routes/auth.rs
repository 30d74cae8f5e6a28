use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::Identity,
    routes::extract::bearer_token,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub pseudo: String,
    pub password: String,
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub pseudo: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: Uuid,
    pub identity: Identity,
}

/// Handler for user registration
pub async fn signup(
    State(state): State<AppState>,
    Json(request): Json<SignupRequest>,
) -> AppResult<(StatusCode, Json<Identity>)> {
    let identity = state
        .auth
        .signup(&request.pseudo, &request.password, request.email)
        .await?;

    Ok((StatusCode::CREATED, Json(identity)))
}

/// Handler for login. Authentication and session creation are two explicit
/// steps: login only verifies credentials, the session collaborator opens
/// the session.
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let identity = state.auth.login(&request.pseudo, &request.password).await?;
    let token = state.sessions.create(identity.clone()).await;

    tracing::info!(user_id = identity.id, pseudo = %identity.pseudo, "session opened");

    Ok(Json(LoginResponse { token, identity }))
}

/// Handler for logout. Idempotent: an unknown or stale token behaves as
/// already logged out.
pub async fn logout(
    State(state): State<AppState>,
    headers: axum::http::HeaderMap,
) -> StatusCode {
    if let Some(token) = bearer_token(&headers) {
        state.sessions.logout(token).await;
    }
    StatusCode::NO_CONTENT
}
