use std::fmt;

use serde::{Deserialize, Serialize};

/// Authorization-code client registration at the identity provider
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub authorization_url: String,
    pub token_url: String,
    /// Where the provider sends the browser back to (`/oauth` on this server)
    pub redirect_url: String,
    pub scopes: Vec<String>,
    /// Lifetime of a login state before `/oauth` rejects it
    pub state_ttl_secs: u64,
    /// Timeout for every call to the provider (page fetch and code exchange)
    pub timeout_secs: u64,
}

impl Default for OAuthConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            authorization_url: "https://accounts.google.com/o/oauth2/v2/auth".to_string(),
            token_url: "https://www.googleapis.com/oauth2/v4/token".to_string(),
            redirect_url: "http://localhost:8080/oauth".to_string(),
            scopes: vec!["email".to_string()],
            state_ttl_secs: 600,
            timeout_secs: 10,
        }
    }
}

impl fmt::Debug for OAuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("authorization_url", &self.authorization_url)
            .field("token_url", &self.token_url)
            .field("redirect_url", &self.redirect_url)
            .field("scopes", &self.scopes)
            .field("state_ttl_secs", &self.state_ttl_secs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}
