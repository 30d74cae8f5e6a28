use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// A film in the catalogue.
///
/// The id is the canonical identifier assigned by the catalogue import
/// source, so reimports upsert in place. Genre is kept as the comma-joined
/// text the source delivers ("Action, Drama"); [`Film::genre_tokens`] is the
/// normalized view used everywhere genres are compared or counted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Film {
    pub id: i64,
    pub title: String,
    pub year: Option<i32>,
    pub director: Option<String>,
    pub genre: String,
    /// Actor names in billing order.
    pub cast: Vec<String>,
}

impl Film {
    /// Splits the genre field on commas into trimmed, non-empty tokens.
    ///
    /// Casing is preserved; callers that compare tokens lowercase them.
    pub fn genre_tokens(&self) -> Vec<String> {
        self.genre
            .split(',')
            .map(|g| g.trim())
            .filter(|g| !g.is_empty())
            .map(|g| g.to_string())
            .collect()
    }
}

/// User role. Role-specific behavior lives in free functions over this enum
/// rather than a type hierarchy.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Client,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Client => "client",
            Role::Admin => "admin",
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "client" => Ok(Role::Client),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role '{}'", other)),
        }
    }
}

/// A stored user record. Carries the password hash and must never be
/// serialized into a response; the public view is [`Identity`].
#[derive(Debug, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub pseudo: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Fields needed to persist a new user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub pseudo: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: Role,
}

/// Public identity view returned by signup/login. No hash, by construction.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: i64,
    pub pseudo: String,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            pseudo: user.pseudo.clone(),
            role: user.role,
        }
    }
}

/// Reference to a film by canonical id or by human-entered title.
#[derive(Debug, Clone)]
pub enum FilmRef {
    Id(i64),
    Title(String),
}

impl std::fmt::Display for FilmRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FilmRef::Id(id) => write!(f, "id {}", id),
            FilmRef::Title(title) => write!(f, "{}", title),
        }
    }
}

/// Permission check for admin-only operations.
pub fn ensure_admin(identity: &Identity) -> AppResult<()> {
    match identity.role {
        Role::Admin => Ok(()),
        Role::Client => Err(AppError::Forbidden),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn film(genre: &str) -> Film {
        Film {
            id: 1,
            title: "Heat".to_string(),
            year: Some(1995),
            director: Some("Michael Mann".to_string()),
            genre: genre.to_string(),
            cast: vec!["Al Pacino".to_string(), "Robert De Niro".to_string()],
        }
    }

    #[test]
    fn test_genre_tokens_split_and_trim() {
        let f = film("Action, Drama ,Crime");
        assert_eq!(f.genre_tokens(), vec!["Action", "Drama", "Crime"]);
    }

    #[test]
    fn test_genre_tokens_empty_field() {
        let f = film("");
        assert!(f.genre_tokens().is_empty());
    }

    #[test]
    fn test_genre_tokens_skip_blank_segments() {
        let f = film("Action,, ,Drama");
        assert_eq!(f.genre_tokens(), vec!["Action", "Drama"]);
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!("client".parse::<Role>().unwrap(), Role::Client);
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("superuser".parse::<Role>().is_err());
        assert_eq!(Role::Admin.as_str(), "admin");
    }

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_string(&Role::Client).unwrap(), "\"client\"");
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_identity_from_user_omits_hash() {
        let user = User {
            id: 7,
            pseudo: "alice".to_string(),
            email: None,
            password_hash: "$argon2id$...".to_string(),
            role: Role::Client,
        };
        let identity = Identity::from(&user);
        assert_eq!(identity.id, 7);
        assert_eq!(identity.pseudo, "alice");
        assert_eq!(identity.role, Role::Client);
        let json = serde_json::to_string(&identity).unwrap();
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_ensure_admin() {
        let admin = Identity {
            id: 1,
            pseudo: "root".to_string(),
            role: Role::Admin,
        };
        let client = Identity {
            id: 2,
            pseudo: "bob".to_string(),
            role: Role::Client,
        };
        assert!(ensure_admin(&admin).is_ok());
        assert!(matches!(ensure_admin(&client), Err(AppError::Forbidden)));
    }
}
