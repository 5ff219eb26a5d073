use auth_identity::IdentityError;
use auth_oauth::OAuthError;
use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use entity_store::StoreError;
use error_common::codes;
use thiserror::Error;
use tracing::{error, warn};
use uuid::Uuid;

/// Header carrying the id under which an error response was logged
pub const ERROR_ID_HEADER: &str = "x-error-id";

/// Main API error enum
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// The request body could not be parsed at all
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    /// No usable session, or the token could not be introspected
    #[error("Not authorized: {message}")]
    Authentication { message: String, code: &'static str },

    /// The caller does not own the entity
    #[error("Not authorized: {message}")]
    Authorization { message: String },

    #[error("Resource not found: {resource_type} {id}")]
    NotFound { resource_type: String, id: String },

    #[error("Resource conflict: {message}")]
    Conflict { message: String },

    #[error("Upstream error: {message}")]
    Upstream { message: String, code: &'static str },

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl ApiError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: codes::authentication::SESSION_INVALID,
        }
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        Self::Authorization {
            message: message.into(),
        }
    }

    pub fn not_found(resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Conflict {
            message: message.into(),
        }
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
            code: codes::upstream::PROVIDER_UNREACHABLE,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation { .. } | ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            ApiError::Authorization { .. } => StatusCode::FORBIDDEN,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Conflict { .. } => StatusCode::CONFLICT,
            ApiError::Upstream { .. } => StatusCode::BAD_GATEWAY,
            ApiError::Store(store) => match store {
                StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                StoreError::Conflict { .. } | StoreError::Constraint(_) => StatusCode::CONFLICT,
                StoreError::InvalidBatch(_) | StoreError::Backend(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
            ApiError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error type string
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => "validation_error",
            ApiError::BadRequest { .. } => "bad_request",
            ApiError::Authentication { .. } => "authentication_error",
            ApiError::Authorization { .. } => "authorization_error",
            ApiError::NotFound { .. } => "not_found",
            ApiError::Conflict { .. } => "conflict",
            ApiError::Upstream { .. } => "upstream_error",
            ApiError::Store(_) => "storage_error",
            ApiError::Internal { .. } => "internal_error",
        }
    }

    /// Stable code attached to the log line
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::Validation { .. } => codes::validation::INVALID_INPUT,
            ApiError::BadRequest { .. } => codes::validation::MALFORMED_BODY,
            ApiError::Authentication { code, .. } | ApiError::Upstream { code, .. } => *code,
            ApiError::Authorization { .. } => codes::authorization::NOT_OWNER,
            ApiError::NotFound { .. } => codes::resource::NOT_FOUND,
            ApiError::Conflict { .. } => codes::resource::CONFLICT,
            ApiError::Store(store) => match store {
                StoreError::NotFound(_) => codes::resource::NOT_FOUND,
                StoreError::Conflict { .. } => codes::storage::REVISION_CONFLICT,
                StoreError::Constraint(_) => codes::storage::CONSTRAINT_VIOLATION,
                StoreError::InvalidBatch(_) | StoreError::Backend(_) => {
                    codes::storage::BACKEND_FAILURE
                }
            },
            ApiError::Internal { .. } => codes::system::INTERNAL_ERROR,
        }
    }

    /// Message rendered to the client; server-side details stay in the log
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Store(StoreError::Conflict { key, .. }) => format!(
                "Resource conflict: {key} was modified concurrently, retry the request"
            ),
            ApiError::Store(StoreError::Constraint(message)) => {
                format!("Resource conflict: {message}")
            }
            ApiError::Store(StoreError::NotFound(key)) => format!("Resource not found: {key}"),
            ApiError::Store(_) => "Storage backend failure".to_string(),
            ApiError::Internal { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        match error {
            IdentityError::NoSession => {
                ApiError::authentication("no active session, log in at /login/")
            }
            IdentityError::Upstream(_) | IdentityError::MalformedResponse(_) => {
                warn!(error = %error, "Token introspection failed");
                ApiError::Authentication {
                    message: "token could not be verified".to_string(),
                    code: codes::authentication::INTROSPECTION_FAILED,
                }
            }
            IdentityError::Configuration(message) => ApiError::internal(message),
        }
    }
}

impl From<OAuthError> for ApiError {
    fn from(error: OAuthError) -> Self {
        match error {
            OAuthError::InvalidState => ApiError::Authentication {
                message: error.to_string(),
                code: codes::authentication::LOGIN_STATE_INVALID,
            },
            OAuthError::AccessDenied(_) => ApiError::authentication(error.to_string()),
            OAuthError::InvalidRequest(message) => ApiError::validation(message),
            OAuthError::ExternalProviderError(_) => ApiError::upstream(error.to_string()),
            OAuthError::TokenExchange(_) => ApiError::Upstream {
                message: error.to_string(),
                code: codes::upstream::TOKEN_EXCHANGE_FAILED,
            },
            OAuthError::Configuration(message) => ApiError::internal(message),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest {
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let error_id = Uuid::new_v4().to_string();
        let status_code = self.status_code();

        // Log the error with correlation ID
        if status_code.is_server_error() {
            error!(
                error_id = %error_id,
                error_type = %self.error_type(),
                error_code = %self.error_code(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API error occurred"
            );
        } else {
            warn!(
                error_id = %error_id,
                error_type = %self.error_type(),
                error_code = %self.error_code(),
                status_code = %status_code.as_u16(),
                error = %self,
                "API request rejected"
            );
        }

        let mut response = (
            status_code,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            format!("ERROR: {}", self.public_message()),
        )
            .into_response();

        if let Ok(value) = HeaderValue::from_str(&error_id) {
            response.headers_mut().insert(ERROR_ID_HEADER, value);
        }
        response
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
