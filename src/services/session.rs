use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::models::Identity;

struct SessionEntry {
    identity: Identity,
    expires_at: DateTime<Utc>,
}

/// In-process session map: token to authenticated identity.
///
/// Lifetime is extend-on-activity: every successful resolve pushes the
/// expiry out by the configured TTL. The map is guarded by an async RwLock;
/// a request racing a concurrent logout may see a stale entry disappear,
/// which simply resolves as "already logged out".
#[derive(Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<Uuid, SessionEntry>>>,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(ttl: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn with_ttl_secs(secs: u64) -> Self {
        Self::new(Duration::seconds(secs as i64))
    }

    /// Opens a session for an authenticated identity and returns its token.
    pub async fn create(&self, identity: Identity) -> Uuid {
        let token = Uuid::new_v4();
        let entry = SessionEntry {
            identity,
            expires_at: Utc::now() + self.ttl,
        };
        self.sessions.write().await.insert(token, entry);
        token
    }

    /// Resolves a token to its identity, extending the TTL. Expired entries
    /// are evicted and resolve to None.
    pub async fn resolve(&self, token: Uuid) -> Option<Identity> {
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(&token) {
            Some(entry) if entry.expires_at > Utc::now() => {
                entry.expires_at = Utc::now() + self.ttl;
                Some(entry.identity.clone())
            }
            Some(_) => {
                sessions.remove(&token);
                None
            }
            None => None,
        }
    }

    /// Closes a session. Unknown tokens are ignored.
    pub async fn logout(&self, token: Uuid) {
        self.sessions.write().await.remove(&token);
    }
}
