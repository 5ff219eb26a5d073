use serde::{Deserialize, Serialize};

/// Where and how bearer tokens are introspected
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Userinfo endpoint queried with the caller's bearer token
    pub userinfo_url: String,
    /// Field of the userinfo document holding the stable user id
    pub user_id_field: String,
    /// Request timeout for a single introspection call
    pub timeout_secs: u64,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            userinfo_url: "https://www.googleapis.com/oauth2/v2/userinfo".to_string(),
            user_id_field: "id".to_string(),
            timeout_secs: 10,
        }
    }
}
