use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{Identity, NewUser, Role},
    services::password::{self, PasswordPolicy},
    store::UserStore,
};

/// Signup and login over the credential store.
///
/// Login is read-only; session creation is the caller's explicit
/// collaborator call, never a side effect here.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    policy: PasswordPolicy,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, policy: PasswordPolicy) -> Self {
        Self { users, policy }
    }

    /// Registers a new user with the default client role.
    ///
    /// Pseudo collisions are detected case-insensitively; the storage
    /// backend's unique index backstops concurrent signups.
    pub async fn signup(
        &self,
        pseudo: &str,
        password: &str,
        email: Option<String>,
    ) -> AppResult<Identity> {
        let pseudo = pseudo.trim();
        if pseudo.is_empty() {
            return Err(AppError::InvalidInput("pseudo must not be empty".to_string()));
        }

        if self.users.find_by_pseudo(pseudo).await?.is_some() {
            return Err(AppError::DuplicatePseudo(pseudo.to_string()));
        }

        self.policy
            .validate(password)
            .map_err(AppError::WeakPassword)?;

        let password_hash = password::hash_password(password)?;
        let user = self
            .users
            .create(NewUser {
                pseudo: pseudo.to_string(),
                email,
                password_hash,
                role: Role::Client,
            })
            .await?;

        tracing::info!(user_id = user.id, pseudo = %user.pseudo, "user signed up");

        Ok(Identity::from(&user))
    }

    /// Authenticates a pseudo/password pair and returns the public identity.
    pub async fn login(&self, pseudo: &str, password: &str) -> AppResult<Identity> {
        let user = self
            .users
            .find_by_pseudo(pseudo)
            .await?
            .ok_or_else(|| AppError::UserNotFound(pseudo.to_string()))?;

        if !password::verify_password(password, &user.password_hash) {
            tracing::debug!(pseudo = %pseudo, "password verification failed");
            return Err(AppError::InvalidCredentials);
        }

        Ok(Identity::from(&user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;
    use crate::store::{MemoryStore, MockUserStore};

    fn service_with_memory() -> AuthService {
        AuthService::new(Arc::new(MemoryStore::new()), PasswordPolicy::new(8))
    }

    #[tokio::test]
    async fn test_signup_then_login() {
        let auth = service_with_memory();

        let created = auth.signup("alice", "Str0ng!Pwd", None).await.unwrap();
        assert_eq!(created.pseudo, "alice");
        assert_eq!(created.role, Role::Client);

        let identity = auth.login("alice", "Str0ng!Pwd").await.unwrap();
        assert_eq!(identity.id, created.id);
        assert_eq!(identity.role, Role::Client);
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let auth = service_with_memory();
        auth.signup("alice", "Str0ng!Pwd", None).await.unwrap();

        let err = auth.login("alice", "wrong").await.unwrap_err();
        assert!(matches!(err, AppError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_login_unknown_pseudo() {
        let auth = service_with_memory();
        let err = auth.login("ghost", "Str0ng!Pwd").await.unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[tokio::test]
    async fn test_signup_duplicate_pseudo_any_casing() {
        let auth = service_with_memory();
        auth.signup("Bob", "Str0ng!Pwd", None).await.unwrap();

        let err = auth.signup("bob", "Other1!Pwd", None).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicatePseudo(_)));
    }

    #[tokio::test]
    async fn test_signup_weak_password_reports_reason() {
        let auth = service_with_memory();
        let err = auth.signup("carol", "weak", None).await.unwrap_err();
        match err {
            AppError::WeakPassword(reason) => {
                assert!(reason.contains("uppercase"));
            }
            other => panic!("expected WeakPassword, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_signup_empty_pseudo_rejected() {
        let auth = service_with_memory();
        let err = auth.signup("   ", "Str0ng!Pwd", None).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_signup_checks_store_before_hashing() {
        let mut users = MockUserStore::new();
        users
            .expect_find_by_pseudo()
            .returning(|pseudo| {
                let pseudo = pseudo.to_string();
                Ok(Some(User {
                    id: 1,
                    pseudo,
                    email: None,
                    password_hash: "hash".to_string(),
                    role: Role::Client,
                }))
            });
        // No expect_create: signup must not reach the insert.

        let auth = AuthService::new(Arc::new(users), PasswordPolicy::new(8));
        let err = auth.signup("taken", "Str0ng!Pwd", None).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicatePseudo(_)));
    }

    #[tokio::test]
    async fn test_login_surfaces_storage_failure_as_storage_error() {
        let mut users = MockUserStore::new();
        users
            .expect_find_by_pseudo()
            .returning(|_| Err(AppError::Internal("connection lost".to_string())));

        let auth = AuthService::new(Arc::new(users), PasswordPolicy::new(8));
        let err = auth.login("alice", "Str0ng!Pwd").await.unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
