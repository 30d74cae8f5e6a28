use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{ensure_admin, Film, Role},
    routes::extract::AuthUser,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ImportRequest {
    pub query: String,
}

/// Handler for importing a film from the external catalogue source.
pub async fn import_film(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Json(request): Json<ImportRequest>,
) -> AppResult<(StatusCode, Json<Film>)> {
    ensure_admin(&identity)?;

    let importer = state.importer.as_ref().ok_or_else(|| {
        AppError::ExternalApi("catalogue import is not configured".to_string())
    })?;

    let film = importer.import(&request.query).await?;
    Ok((StatusCode::CREATED, Json(film)))
}

/// Handler for promoting a user to the admin role.
pub async fn promote_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_admin(&identity)?;

    let updated = state.users.update_role(user_id, Role::Admin).await?;
    if !updated {
        return Err(AppError::UserNotFound(format!("id {}", user_id)));
    }

    tracing::info!(admin_id = identity.id, user_id, "user promoted to admin");
    Ok(StatusCode::NO_CONTENT)
}

/// Handler for deleting a user. Favorites go with the user; admins cannot
/// delete their own account.
pub async fn delete_user(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(user_id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_admin(&identity)?;

    if user_id == identity.id {
        return Err(AppError::InvalidInput(
            "admins cannot delete their own account".to_string(),
        ));
    }

    let deleted = state.users.delete(user_id).await?;
    if !deleted {
        return Err(AppError::UserNotFound(format!("id {}", user_id)));
    }

    tracing::info!(admin_id = identity.id, user_id, "user deleted");
    Ok(StatusCode::NO_CONTENT)
}
