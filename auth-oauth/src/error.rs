use thiserror::Error;

#[derive(Error, Debug)]
pub enum OAuthError {
    /// The state parameter is unknown, expired or already used
    #[error("Invalid or expired state parameter")]
    InvalidState,

    /// The user or provider refused the authorization request
    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The provider could not be reached
    #[error("External provider error: {0}")]
    ExternalProviderError(String),

    /// The token endpoint rejected or failed the code exchange
    #[error("Token exchange failed: {0}")]
    TokenExchange(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, OAuthError>;
