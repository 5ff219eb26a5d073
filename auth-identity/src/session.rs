use chrono::{DateTime, Utc};
use dashmap::DashMap;

use crate::models::BearerToken;

/// A bearer token issued by this server's OAuth exchange
#[derive(Debug, Clone)]
pub struct Session {
    pub fingerprint: String,
    pub created_at: DateTime<Utc>,
}

/// Tokens issued by `/oauth` and not yet revoked by `/logout`.
///
/// Keyed by the token's SHA-256 digest so raw tokens are never held here.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: DashMap<String, Session>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a freshly issued token. Registering the same token twice keeps
    /// the original session.
    pub fn register(&self, token: &BearerToken) -> Session {
        self.sessions
            .entry(token.digest())
            .or_insert_with(|| Session {
                fingerprint: token.fingerprint(),
                created_at: Utc::now(),
            })
            .clone()
    }

    pub fn is_active(&self, token: &BearerToken) -> bool {
        self.sessions.contains_key(&token.digest())
    }

    /// Returns true if the token had an active session
    pub fn revoke(&self, token: &BearerToken) -> bool {
        self.sessions.remove(&token.digest()).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
