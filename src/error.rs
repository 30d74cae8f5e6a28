use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("pseudo '{0}' is already taken")]
    DuplicatePseudo(String),

    #[error("password rejected: {0}")]
    WeakPassword(String),

    #[error("no user named '{0}'")]
    UserNotFound(String),

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("no film matching '{0}'")]
    FilmNotFound(String),

    #[error("authentication required")]
    Unauthorized,

    #[error("admin privileges required")]
    Forbidden,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("external API error: {0}")]
    ExternalApi(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("internal server error: {0}")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::DuplicatePseudo(_) => (StatusCode::CONFLICT, self.to_string()),
            AppError::WeakPassword(_) => (StatusCode::UNPROCESSABLE_ENTITY, self.to_string()),
            AppError::UserNotFound(_) | AppError::FilmNotFound(_) => {
                (StatusCode::NOT_FOUND, self.to_string())
            }
            AppError::InvalidCredentials | AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, self.to_string())
            }
            AppError::Forbidden => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::InvalidInput(_) => (StatusCode::BAD_REQUEST, self.to_string()),
            AppError::ExternalApi(msg) => (StatusCode::BAD_GATEWAY, msg.clone()),
            AppError::HttpClient(e) => {
                tracing::error!(error = %e, "upstream request failed");
                (
                    StatusCode::BAD_GATEWAY,
                    "upstream service failure".to_string(),
                )
            }
            // Storage and internal failures are logged with full detail but
            // surfaced with a generic message: raw SQL error text must never
            // reach the end user.
            AppError::Storage(e) => {
                tracing::error!(error = %e, "storage operation failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!(error = %msg, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_pseudo_maps_to_conflict() {
        let response = AppError::DuplicatePseudo("bob".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_invalid_credentials_maps_to_unauthorized() {
        let response = AppError::InvalidCredentials.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_weak_password_maps_to_unprocessable() {
        let response = AppError::WeakPassword("too short".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_internal_error_maps_to_500() {
        let err = AppError::Internal("connection refused at 10.0.0.1:5432".to_string());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
