use axum::http::{header, request::Parts, HeaderMap};
use uuid::Uuid;

use crate::{
    error::AppError,
    models::Identity,
    state::AppState,
};

/// Parses a `Authorization: Bearer <uuid>` header into a session token.
pub fn bearer_token(headers: &HeaderMap) -> Option<Uuid> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ")?;
    Uuid::parse_str(token.trim()).ok()
}

/// Extractor for routes that require an authenticated session.
///
/// Rejects with 401 when the bearer token is missing, malformed, expired,
/// or already logged out.
pub struct AuthUser(pub Identity);

#[async_trait::async_trait]
impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let identity = state
            .sessions
            .resolve(token)
            .await
            .ok_or(AppError::Unauthorized)?;
        Ok(AuthUser(identity))
    }
}

/// Extractor for routes that behave differently for logged-in callers but
/// stay public. Never rejects; an invalid token reads as anonymous.
pub struct MaybeAuthUser(pub Option<Identity>);

#[async_trait::async_trait]
impl axum::extract::FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let identity = match bearer_token(&parts.headers) {
            Some(token) => state.sessions.resolve(token).await,
            None => None,
        };
        Ok(MaybeAuthUser(identity))
    }
}
