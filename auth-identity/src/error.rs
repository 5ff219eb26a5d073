use thiserror::Error;

#[derive(Error, Debug)]
pub enum IdentityError {
    /// No bearer token was presented, or it was never issued here or was revoked
    #[error("No active session for the presented credential")]
    NoSession,

    /// The userinfo call failed at the transport or HTTP level
    #[error("Identity provider unavailable: {0}")]
    Upstream(String),

    /// The userinfo response did not contain a usable user id
    #[error("Malformed userinfo response: {0}")]
    MalformedResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, IdentityError>;
